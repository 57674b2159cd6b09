//! Error types for the cleanup coordinator and its diagnostics API
//!
//! Cache operations themselves are total; only lifecycle and HTTP surfaces fail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Coordinator Error Enum ==
/// Unified error type for the coordinator and diagnostics API.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoordinatorError {
    /// `start` was called while a sweep task is still running
    #[error("Cleanup task already started")]
    AlreadyStarted,

    /// `start` was called while a `stop` is still waiting for the sweep task
    #[error("Cleanup task is stopping")]
    Stopping,

    /// No cache is registered under the given name
    #[error("Unknown cache: {0}")]
    UnknownCache(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoordinatorError::AlreadyStarted | CoordinatorError::Stopping => StatusCode::CONFLICT,
            CoordinatorError::UnknownCache(_) => StatusCode::NOT_FOUND,
            CoordinatorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            CoordinatorError::AlreadyStarted.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CoordinatorError::Stopping.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CoordinatorError::UnknownCache("x".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CoordinatorError::InvalidRequest("bad".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoordinatorError::UnknownCache("users".into()).to_string(),
            "Unknown cache: users"
        );
    }
}
