use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::{PublicUser, Role, UserId, UserStatus};
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct UsersQuery {}

/// Directory row for the staff dashboard.
#[derive(Serialize, Debug)]
pub struct UserDirectoryEntry {
    pub id: UserId,
    pub name: String,
    pub role: String,
    pub status: String,
    /// Last-login tracking is not implemented; fixed placeholder.
    pub login: String,
}

#[derive(Serialize, Debug)]
pub struct UsersResponse {
    pub users: Vec<UserDirectoryEntry>,
}

impl RequestBody for UsersQuery {
    type Response = UsersResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let users = state
            .list_users()?
            .into_iter()
            .map(|user| UserDirectoryEntry {
                id: user.id,
                name: user.username,
                role: user.role.title_case().to_string(),
                status: user.status.to_string(),
                login: "recently".to_string(),
            })
            .collect();
        Ok(UsersResponse { users })
    }
}

impl IntoResponse for UsersResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SetStatusRequest {
    pub status: Option<String>,
    pub actor: Option<String>,
    pub actor_role: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct UserResponse {
    pub user: PublicUser,
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let status = body
        .status
        .as_deref()
        .and_then(UserStatus::from_name)
        .ok_or_else(|| {
            AppError::Validation("status must be \"Active\" or \"Banned\"".to_string())
        })?;
    let user = state.set_user_status(
        id,
        status,
        body.actor.as_deref().unwrap_or("manager"),
        body.actor_role.as_deref().unwrap_or("manager"),
    )?;
    Ok(Json(UserResponse { user }))
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SetRoleRequest {
    pub role: Option<String>,
    pub actor: Option<String>,
    pub actor_role: Option<String>,
}

pub async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let role = body
        .role
        .as_deref()
        .and_then(Role::from_name)
        .ok_or_else(|| {
            AppError::Validation(
                "role must be \"user\", \"employee\", or \"manager\"".to_string(),
            )
        })?;
    let user = state.set_user_role(
        id,
        role,
        body.actor.as_deref().unwrap_or("manager"),
        body.actor_role.as_deref().unwrap_or("manager"),
    )?;
    Ok(Json(UserResponse { user }))
}
