//! Error types for the HTTP layer.
//!
//! [`ApiError`] classifies every failure into a status code. The response
//! body never carries the underlying detail: clients always receive
//! `{"error": "request failed", "status": N}` and the detail goes to the
//! log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pokespawn_core::CoreError;

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed (bad id, missing or non-numeric
    /// coordinates).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error class.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(id) => Self::NotFound(format!("pokemon {id}")),
            CoreError::InvalidInput(msg) => Self::BadRequest(msg),
            CoreError::StoreUnavailable { source } => Self::Unavailable(source.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "error": "request failed",
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
