use axum::body::Body;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::SystemStats;
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SystemStatsQuery {}

#[derive(Serialize, Debug)]
pub struct SystemStatsResponse {
    pub stats: SystemStats,
}

impl RequestBody for SystemStatsQuery {
    type Response = SystemStatsResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let stats = state.system_stats()?;
        Ok(SystemStatsResponse { stats })
    }
}

impl IntoResponse for SystemStatsResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}
