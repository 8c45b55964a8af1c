//! Error types for prio-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prio_common::{Error as CommonError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or wrong host token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Too many submissions from one player (429)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// prio-common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Common(CommonError::Validation(err))
    }
}

/// Validation failures caused by the session's current state rather than the payload
fn is_state_conflict(err: &ValidationError) -> bool {
    matches!(
        err,
        ValidationError::SessionNotAcceptingVotes { .. }
            | ValidationError::SessionNotEditable
            | ValidationError::InvalidStatusTransition { .. }
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Common(CommonError::Validation(err)) if is_state_conflict(&err) => {
                (StatusCode::CONFLICT, "CONFLICT", err.to_string())
            }
            ApiError::Common(CommonError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            ApiError::Common(CommonError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(ref err) => {
                error!("Common error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err.to_string())
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::TooManyRequests("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (ValidationError::EmptyTitle.into(), StatusCode::BAD_REQUEST),
            (ValidationError::SessionNotEditable.into(), StatusCode::CONFLICT),
            (ApiError::Common(CommonError::NotFound("s".into())), StatusCode::NOT_FOUND),
            (ApiError::Common(CommonError::Config("c".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
