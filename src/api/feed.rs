use axum::body::Body;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::ActivityEntry;
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(Serialize, Debug)]
pub struct FeedResponse {
    pub activities: Vec<ActivityEntry>,
}

impl IntoResponse for FeedResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ManagerFeedQuery {
    /// `all` (default), `security`, or `staff`.
    pub kind: Option<String>,
}

impl RequestBody for ManagerFeedQuery {
    type Response = FeedResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let activities = state.manager_feed(self.kind.as_deref().unwrap_or("all"))?;
        Ok(FeedResponse { activities })
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct EmployeeFeedQuery {
    /// `all` (default), `logins`, or `proofs`.
    pub kind: Option<String>,
}

impl RequestBody for EmployeeFeedQuery {
    type Response = FeedResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let activities = state.employee_feed(self.kind.as_deref().unwrap_or("all"))?;
        Ok(FeedResponse { activities })
    }
}
