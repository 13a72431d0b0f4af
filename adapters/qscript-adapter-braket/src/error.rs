//! Error types for the AWS Braket adapter.

use qscript_hal::HalError;
use qscript_qasm3::Qasm3Error;
use thiserror::Error;

/// Result type for Braket operations.
pub type BraketResult<T> = Result<T, BraketError>;

#[derive(Debug, Error)]
pub enum BraketError {
    #[error("S3 bucket not configured. Set QSCRIPT_BRAKET_S3_BUCKET or braket.s3_bucket.")]
    MissingS3Bucket,

    #[error("Invalid device ARN: {0}")]
    InvalidDeviceArn(String),

    /// A short device name with no known ARN.
    #[error("Unknown Braket device '{0}'")]
    UnknownDevice(String),

    #[error("Braket API error: {0}")]
    BraketApi(String),

    #[error("S3 error: {0}")]
    S3Error(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Task was cancelled: {0}")]
    TaskCancelled(String),

    /// The circuit could not be serialized for Braket.
    #[error("Circuit conversion error: {0}")]
    CircuitError(#[from] Qasm3Error),

    #[error("Device not available: {0}")]
    DeviceUnavailable(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse task result: {0}")]
    ResultParseError(String),
}

impl From<BraketError> for HalError {
    fn from(e: BraketError) -> Self {
        match e {
            BraketError::MissingS3Bucket
            | BraketError::InvalidDeviceArn(_)
            | BraketError::UnknownDevice(_) => HalError::Configuration(e.to_string()),
            BraketError::TaskNotFound(id) => HalError::JobNotFound(id),
            BraketError::TaskFailed(msg) => HalError::JobFailed(msg),
            BraketError::TaskCancelled(_) => HalError::JobCancelled,
            BraketError::DeviceUnavailable(msg) => HalError::BackendUnavailable(msg),
            BraketError::CircuitError(err) => HalError::InvalidCircuit(err.to_string()),
            _ => HalError::Backend(e.to_string()),
        }
    }
}
