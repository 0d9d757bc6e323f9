//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::admin::{SubmissionError, ValidationError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Admin console or campaign submission failed
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Live feed error
    #[error("Feed error: {0}")]
    Feed(#[from] crate::feed::FeedError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (dependency down)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Submission(SubmissionError::Validation(ValidationError::AlreadyAdmin(_))) => {
                (StatusCode::CONFLICT, "ALREADY_ADMIN")
            }
            ApiError::Submission(SubmissionError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::Submission(SubmissionError::Transient(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SUBMISSION_UNAVAILABLE")
            }
            ApiError::Submission(SubmissionError::Fatal(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SUBMISSION_FAILED")
            }
            ApiError::Feed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "FEED_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_status() {
        let cases = [
            (
                ApiError::from(SubmissionError::from(ValidationError::InvalidAddress(
                    "0x111".into(),
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(SubmissionError::from(ValidationError::AlreadyAdmin(
                    "0xabc".into(),
                ))),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(SubmissionError::Transient("busy".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(SubmissionError::Fatal("reverted".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_not_found_status() {
        let response = ApiError::NotFound("campaign 9".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
