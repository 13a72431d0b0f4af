//! Backend errors.

use qscript_ir::IrError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Could not submit job: {0}")]
    SubmissionFailed(String),

    /// The backend reports the job as failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job was cancelled")]
    JobCancelled,

    #[error("No such job: {0}")]
    JobNotFound(String),

    /// The result was requested before the job reached `Completed`.
    #[error("Job {0} has not completed")]
    JobNotReady(String),

    /// Rejected by [`Backend::validate`](crate::Backend::validate).
    #[error("Circuit rejected: {0}")]
    InvalidCircuit(String),

    #[error(transparent)]
    Circuit(#[from] IrError),

    #[error("Backend misconfigured: {0}")]
    Configuration(String),

    /// The wait deadline passed while the job was still pending.
    #[error("Gave up waiting for job {0}")]
    Timeout(String),

    #[error("Circuit does not fit the backend: {0}")]
    CircuitTooLarge(String),

    #[error("Shot count rejected: {0}")]
    InvalidShots(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// Whether the job reached a terminal state other than `Completed`.
    pub fn is_job_outcome(&self) -> bool {
        matches!(
            self,
            HalError::JobFailed(_) | HalError::JobCancelled | HalError::Timeout(_)
        )
    }
}

pub type HalResult<T> = Result<T, HalError>;
