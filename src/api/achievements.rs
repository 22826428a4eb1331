use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::{Achievement, UserId};
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AchievementsQuery {
    pub user_id: Option<UserId>,
    /// `all` (default), `verified`, or `pending`.
    pub status: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct AchievementsResponse {
    pub achievements: Vec<Achievement>,
}

impl RequestBody for AchievementsQuery {
    type Response = AchievementsResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let achievements =
            state.list_achievements(self.user_id, self.status.as_deref().unwrap_or("all"))?;
        Ok(AchievementsResponse { achievements })
    }
}

impl IntoResponse for AchievementsResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitAchievementRequest {
    pub user_id: Option<UserId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub proof_file_name: Option<String>,
    pub proof_data_url: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SubmitAchievementResponse {
    pub achievement: Achievement,
}

impl RequestBody for SubmitAchievementRequest {
    type Response = SubmitAchievementResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let achievement = state.submit_achievement(
            self.user_id,
            self.title.as_deref(),
            self.description.as_deref().unwrap_or_default(),
            self.proof_file_name.as_deref().unwrap_or_default(),
            self.proof_data_url.as_deref().unwrap_or_default(),
        )?;
        Ok(SubmitAchievementResponse { achievement })
    }
}

impl IntoResponse for SubmitAchievementResponse {
    fn into_response(self) -> Response<Body> {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}
