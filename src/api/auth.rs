use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::PublicUser;
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct RegisterResponse {
    pub user: PublicUser,
}

impl RequestBody for RegisterRequest {
    type Response = RegisterResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let user = state.register_user(
            &self.username,
            &self.email,
            &self.password,
            self.role.as_deref(),
        )?;
        Ok(RegisterResponse { user })
    }
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response<Body> {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Role the client claims to be signing in as; "employee" selects the
    /// staff portal.
    pub role: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub user: PublicUser,
}

impl RequestBody for LoginRequest {
    type Response = LoginResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let user = state.login(&self.username, &self.password, self.role.as_deref())?;
        Ok(LoginResponse { user })
    }
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{Role, Store};

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState {
            store: Arc::new(Store::new(dir.path().join("db.json"))),
        };
        (state, dir)
    }

    #[tokio::test]
    async fn register_then_login() -> Result<(), AppError> {
        let (state, _dir) = test_state();

        let registered = RegisterRequest {
            username: "nova".to_string(),
            email: "nova@x.io".to_string(),
            password: "pw123".to_string(),
            role: None,
        }
        .request(state.clone())
        .await?;
        assert_eq!(registered.user.role, Role::User);

        let logged_in = LoginRequest {
            username: "nova".to_string(),
            password: "pw123".to_string(),
            role: None,
        }
        .request(state)
        .await?;
        assert_eq!(logged_in.user.id, registered.user.id);

        Ok(())
    }

    #[tokio::test]
    async fn login_with_missing_fields_is_a_validation_error() {
        let (state, _dir) = test_state();

        let err = LoginRequest::default()
            .request(state)
            .await
            .expect_err("empty request");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
