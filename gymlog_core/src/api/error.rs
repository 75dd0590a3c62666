//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by request handlers, rendered as `{"message": ...}`
#[derive(Debug)]
pub enum ApiError {
    /// The requested record does not exist
    NotFound(&'static str),
    /// The request body failed schema validation
    BadRequest(&'static str),
    /// Anything else
    Internal(String),
}

impl From<crate::Error> for ApiError {
    fn from(e: crate::Error) -> Self {
        tracing::error!("Request failed: {}", e);
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
