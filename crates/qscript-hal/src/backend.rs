//! Backend trait.
//!
//! Every backend, local or remote, follows the same lifecycle:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status()* ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)       (async)
//! ```
//!
//! [`Backend::wait`] wraps the polling loop. A local simulator finishes
//! inside `submit`, so the first poll already sees `Completed`; a Braket
//! task may sit in a hardware queue for hours.
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | provided | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |
//! | `run()` | async | provided | `HalResult<ExecutionResult>` |

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use qscript_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// How [`Backend::wait`] polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    /// Give up with [`HalError::Timeout`] once this much time has passed.
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(300),
        }
    }
}

impl WaitPolicy {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }
}

/// A quantum execution target.
///
/// `capabilities()` is synchronous and infallible; implementations cache
/// it at construction. `submit()` returns a job in `Queued` (or already
/// terminal) state, and `result()` is only meaningful once `status()`
/// reports `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// Lightweight liveness check.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check a circuit against [`Capabilities`] before submission.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(self.capabilities().check(circuit))
    }

    /// Submit a fully bound circuit for `shots` repetitions.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Fetch the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Polling policy used by [`wait`](Self::wait).
    fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::default()
    }

    /// Block until the job is terminal and return its result.
    ///
    /// `Failed` maps to [`HalError::JobFailed`], `Cancelled` to
    /// [`HalError::JobCancelled`]. No retries.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.wait_with(job_id, self.wait_policy()).await
    }

    async fn wait_with(&self, job_id: &JobId, policy: WaitPolicy) -> HalResult<ExecutionResult> {
        let deadline = Instant::now() + policy.timeout;
        let mut polls = 0u32;

        loop {
            let status = self.status(job_id).await?;
            polls += 1;

            match status {
                JobStatus::Completed => {
                    debug!(job = %job_id, polls, "job completed");
                    return self.result(job_id).await;
                }
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    if Instant::now() >= deadline {
                        return Err(HalError::Timeout(job_id.0.clone()));
                    }
                    if polls % 20 == 0 {
                        info!(job = %job_id, %status, polls, "still waiting");
                    }
                    sleep(policy.poll_interval).await;
                }
            }
        }
    }

    /// Validate, submit and wait in one call.
    async fn run(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        match self.validate(circuit).await? {
            ValidationResult::Valid => {}
            ValidationResult::Invalid { reasons } => {
                return Err(HalError::InvalidCircuit(reasons.join("; ")));
            }
        }
        let job_id = self.submit(circuit, shots).await?;
        debug!(backend = self.name(), job = %job_id, shots, "submitted");
        self.wait(&job_id).await
    }
}

/// Liveness report from [`Backend::availability`].
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    pub is_available: bool,
    /// Jobs ahead in the provider queue, if known.
    pub queue_depth: Option<u32>,
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Typical for simulators: nothing queued.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            status_message: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Outcome of [`Backend::validate`].
#[derive(Debug, Clone)]
pub enum ValidationResult {
    Valid,
    Invalid { reasons: Vec<String> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}
