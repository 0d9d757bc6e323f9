//! Admin Console
//!
//! Address validation, the admin registry and the submission layer every
//! console action goes through.
//!
//! Actions:
//! - add admin (duplicates rejected before submission)
//! - remove admin
//! - check admin status
//! - transfer creator
//!
//! Each one is validated, submitted through a `SubmissionTransport`, applied,
//! and recorded in the activity log.

mod address;
mod error;
mod registry;
mod submit;

pub use address::{is_valid_address, shorten, Address};
pub use error::{SubmissionError, SubmissionResult, ValidationError};
pub use registry::{
    ActivityEntry, Admin, AdminAction, AdminRegistry, AdminStatus, DEFAULT_OPERATOR,
};
pub use submit::{
    SimulatedTransport, Submission, SubmissionDelays, SubmissionTransport, Submitter,
};

#[cfg(test)]
pub(crate) use submit::testing;
