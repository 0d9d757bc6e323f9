//! Simulated submissions
//!
//! Every console action ends in a submission to the outside world. There is no
//! chain behind it: `SimulatedTransport` waits a fixed per-action delay and
//! succeeds. The `SubmissionTransport` trait is the seam for anything real.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::address::Address;
use super::error::{SubmissionError, SubmissionResult};

/// An action sent to the transport
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum Submission {
    AddAdmin(Address),
    RemoveAdmin(Address),
    CheckAdmin(Address),
    TransferCreator(Address),
    CreateCampaign(String),
}

impl Submission {
    pub fn name(&self) -> &'static str {
        match self {
            Submission::AddAdmin(_) => "add_admin",
            Submission::RemoveAdmin(_) => "remove_admin",
            Submission::CheckAdmin(_) => "check_admin",
            Submission::TransferCreator(_) => "transfer_creator",
            Submission::CreateCampaign(_) => "create_campaign",
        }
    }
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(&self, submission: &Submission) -> SubmissionResult<()>;
}

/// Simulated round-trip delays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmissionDelays {
    /// Add, remove and transfer
    pub admin: Duration,
    /// Status check
    pub check: Duration,
    /// Campaign creation
    pub campaign: Duration,
}

impl Default for SubmissionDelays {
    fn default() -> Self {
        Self {
            admin: Duration::from_millis(1_500),
            check: Duration::from_millis(1_000),
            campaign: Duration::from_millis(2_000),
        }
    }
}

impl SubmissionDelays {
    /// No waiting at all
    pub fn none() -> Self {
        Self {
            admin: Duration::ZERO,
            check: Duration::ZERO,
            campaign: Duration::ZERO,
        }
    }

    pub fn for_submission(&self, submission: &Submission) -> Duration {
        match submission {
            Submission::CheckAdmin(_) => self.check,
            Submission::CreateCampaign(_) => self.campaign,
            _ => self.admin,
        }
    }
}

/// Transport that sleeps and always succeeds
#[derive(Debug, Clone, Default)]
pub struct SimulatedTransport {
    delays: SubmissionDelays,
}

impl SimulatedTransport {
    pub fn new(delays: SubmissionDelays) -> Self {
        Self { delays }
    }
}

#[async_trait]
impl SubmissionTransport for SimulatedTransport {
    async fn submit(&self, submission: &Submission) -> SubmissionResult<()> {
        let delay = self.delays.for_submission(submission);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

/// Sends submissions and retries transient failures
#[derive(Clone)]
pub struct Submitter {
    transport: Arc<dyn SubmissionTransport>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Submitter {
    pub fn new(transport: Arc<dyn SubmissionTransport>) -> Self {
        Self {
            transport,
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }

    /// Builder method: retry policy
    pub fn retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Submit, retrying transient errors with linear backoff
    pub async fn submit(&self, submission: &Submission) -> SubmissionResult<()> {
        let mut attempt = 0;
        loop {
            match self.transport.submit(submission).await {
                Ok(()) => {
                    tracing::debug!(action = submission.name(), attempt, "Submission accepted");
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        action = submission.name(),
                        attempt,
                        error = %e,
                        "Transient submission failure, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => {
                    tracing::error!(action = submission.name(), error = %e, "Submission failed");
                    return Err(e);
                }
            }
        }
    }
}

impl Default for Submitter {
    fn default() -> Self {
        Self::new(Arc::new(SimulatedTransport::default()))
    }
}

/// Transport that records submissions and replays scripted failures
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<Submission>>,
        pub failures: Mutex<Vec<SubmissionError>>,
    }

    impl RecordingTransport {
        pub fn failing_with(failures: Vec<SubmissionError>) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failures: Mutex::new(failures),
            }
        }

        pub fn sent(&self) -> Vec<Submission> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubmissionTransport for RecordingTransport {
        async fn submit(&self, submission: &Submission) -> SubmissionResult<()> {
            self.sent.lock().unwrap().push(submission.clone());
            let mut failures = self.failures.lock().unwrap();
            if failures.is_empty() {
                Ok(())
            } else {
                Err(failures.remove(0))
            }
        }
    }
}
