//! Admin console error types
//!
//! Submissions fail in one of three ways:
//! - validation: the user fixes the input, nothing was sent
//! - transient: the transport hiccuped, safe to retry
//! - fatal: surfaced and aborted
//!
//! None of them is fatal to the process.

use thiserror::Error;

/// Input rejected before anything is submitted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Address is already an admin: {0}")]
    AlreadyAdmin(String),
}

/// Outcome of a failed submission
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Submission failed: {0}")]
    Fatal(String),
}

impl SubmissionError {
    /// Whether the same submission may succeed if tried again
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionError::Transient(_))
    }
}

/// Result type alias for submissions
pub type SubmissionResult<T> = Result<T, SubmissionError>;
