use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::{Score, UserId};
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScoresQuery {
    pub user_id: Option<UserId>,
}

#[derive(Serialize, Debug)]
pub struct ScoresResponse {
    pub scores: Vec<Score>,
}

impl RequestBody for ScoresQuery {
    type Response = ScoresResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let scores = state.list_scores(self.user_id)?;
        Ok(ScoresResponse { scores })
    }
}

impl IntoResponse for ScoresResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitScoreRequest {
    pub user_id: Option<UserId>,
    pub game: Option<String>,
    /// Raw score text; digits are extracted for aggregation.
    pub score: Option<String>,
    pub date: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SubmitScoreResponse {
    pub score: Score,
}

impl RequestBody for SubmitScoreRequest {
    type Response = SubmitScoreResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let score = state.submit_score(
            self.user_id,
            self.game.as_deref().unwrap_or_default(),
            self.score.as_deref().unwrap_or_default(),
            self.date.as_deref().unwrap_or_default(),
        )?;
        Ok(SubmitScoreResponse { score })
    }
}

impl IntoResponse for SubmitScoreResponse {
    fn into_response(self) -> Response<Body> {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}
