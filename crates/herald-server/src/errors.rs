//! HTTP-facing and startup errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP clients as `{"error": "..."}`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// Body is not a JSON object of the expected shape.
    #[error("Invalid request body")]
    InvalidBody,
    /// `message` is missing or empty.
    #[error("Message cannot be empty")]
    EmptyMessage,
    /// Body exceeds the configured limit.
    #[error("Request body too large")]
    PayloadTooLarge,
    /// The hub has stopped.
    #[error("Notification hub is unavailable")]
    HubUnavailable,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::EmptyMessage => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::HubUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Other socket error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
