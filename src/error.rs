use axum::body::Body;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    StorageError(std::io::Error),
    EncodingError(serde_json::Error),
    Validation(String),
    InvalidCredentials,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            Self::StorageError(err) => format!("Internal storage error: {}", err),
            Self::EncodingError(err) => format!("Internal encoding error: {}", err),
            Self::Validation(msg) => msg.to_string(),
            Self::InvalidCredentials => "invalid credentials".to_string(),
            Self::Forbidden(msg) => msg.to_string(),
            Self::NotFound(msg) => msg.to_string(),
            Self::Conflict(msg) => msg.to_string(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EncodingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response<Body> {
        (self.status_code(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> AppError {
        AppError::StorageError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> AppError {
        AppError::EncodingError(err)
    }
}
