//! Error types for binsight-relay
//!
//! Response bodies are `{"error": ...}` for caller mistakes and
//! `{"error": ..., "details": ...}` for upstream and internal failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// API error type
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing file or unrecognized mode (400)
    #[error("{0}")]
    InputValidation(String),

    /// Request body over the configured limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Network failure, non-2xx or unreadable body from the service (500)
    #[error("Failed to analyze image: {0}")]
    Upstream(#[from] UpstreamError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::InputValidation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            RelayError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, json!({ "error": msg }))
            }
            RelayError::Upstream(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to analyze image",
                    "details": err.to_string(),
                }),
            ),
            RelayError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Internal server error",
                    "details": msg,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, RelayError>;
