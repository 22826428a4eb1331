use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::AppState;

/// Object that can be received as a request.
pub trait RequestBody {
    type Response;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError>;

    async fn as_handler_query(
        State(state): State<AppState>,
        Query(item): Query<Self>,
    ) -> Result<Self::Response, AppError>
    where
        Self: Sized + DeserializeOwned,
        Self::Response: IntoResponse,
    {
        item.request(state).await
    }

    async fn as_json_handler(
        State(state): State<AppState>,
        Json(item): Json<Self>,
    ) -> Result<Self::Response, AppError>
    where
        Self: Sized + DeserializeOwned,
        Self::Response: IntoResponse,
    {
        item.request(state).await
    }
}
