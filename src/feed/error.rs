//! Feed error types

use thiserror::Error;

/// Errors raised by the live feed simulator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    /// A rolling buffer was requested with room for nothing
    #[error("Rolling buffer capacity must be at least 1")]
    ZeroCapacity,

    /// Interval bounds are inverted or zero
    #[error("Invalid tick interval: min {min_ms}ms, max {max_ms}ms")]
    InvalidInterval { min_ms: u64, max_ms: u64 },

    /// A value range is empty or not finite
    #[error("Invalid range for {name}: [{low}, {high})")]
    InvalidRange { name: &'static str, low: f64, high: f64 },

    /// `mount` was called on a dashboard that is already running
    #[error("Dashboard is already mounted")]
    AlreadyMounted,

    /// The feed task is gone
    #[error("Feed driver stopped: {0}")]
    DriverStopped(String),
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
