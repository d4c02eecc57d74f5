//! HTTP error mapping.
//!
//! Client mistakes keep their message; storage and other server failures are
//! logged in full and answered with a generic message.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Errors a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    /// No usable `X-User-Id` header
    MissingOwner,
    /// Malformed query parameter
    BadRequest(String),
    /// Anything raised by the core layer
    Core(Error),
}

/// Result type returned by handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self::Core(value)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::MissingOwner => (
                StatusCode::UNAUTHORIZED,
                "Missing X-User-Id header".to_string(),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Core(err) if err.is_not_found() => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Core(err) if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Core(err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
