use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::achievement::{PendingVerification, ProofImage};
use crate::db::{Achievement, AchievementId};
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct PendingVerificationsQuery {}

#[derive(Serialize, Debug)]
pub struct PendingVerificationsResponse {
    pub verifications: Vec<PendingVerification>,
}

impl RequestBody for PendingVerificationsQuery {
    type Response = PendingVerificationsResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let verifications = state.pending_verifications()?;
        Ok(PendingVerificationsResponse { verifications })
    }
}

impl IntoResponse for PendingVerificationsResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

pub async fn proof(
    State(state): State<AppState>,
    Path(id): Path<AchievementId>,
) -> Result<Json<ProofImage>, AppError> {
    Ok(Json(state.achievement_proof(id)?))
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReviewAchievementRequest {
    pub approved: Option<bool>,
    pub points: Option<i64>,
}

#[derive(Serialize, Debug)]
pub struct ReviewAchievementResponse {
    pub achievement: Achievement,
}

pub async fn review(
    State(state): State<AppState>,
    Path(id): Path<AchievementId>,
    Json(body): Json<ReviewAchievementRequest>,
) -> Result<Json<ReviewAchievementResponse>, AppError> {
    let Some(approved) = body.approved else {
        return Err(AppError::Validation("approved must be boolean".to_string()));
    };
    let achievement = state.review_achievement(id, approved, body.points)?;
    Ok(Json(ReviewAchievementResponse { achievement }))
}
