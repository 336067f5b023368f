//! API error type for inkpost-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use inkpost_common::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No actor present where one is required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Actor present but lacks permission for the target entity (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input fails shape/length/range constraints (400)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthorized => ApiError::Unauthorized,
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Validation(msg) => ApiError::Validation(msg),
            Error::Database(e) => ApiError::Internal(format!("database error: {}", e)),
            Error::Io(e) => ApiError::Internal(format!("io error: {}", e)),
            Error::Config(msg) => ApiError::Internal(format!("configuration error: {}", msg)),
            Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
