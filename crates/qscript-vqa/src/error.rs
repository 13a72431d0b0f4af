//! Error types for the variational optimizer.

use qscript_hal::HalError;
use qscript_ir::IrError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VqaError {
    /// The parameter vector does not match the ansatz.
    #[error("Ansatz takes {expected} parameters, got {got}")]
    ParameterCount { expected: usize, got: usize },

    #[error("Invalid optimizer setting: {0}")]
    InvalidSetting(String),

    #[error("Unknown gradient method '{0}' (expected parameter-shift or finite-difference)")]
    UnknownGradient(String),

    #[error("Ansatz construction failed: {0}")]
    Circuit(#[from] IrError),

    /// The estimator or its backend failed.
    #[error("Cost evaluation failed: {0}")]
    Estimation(#[from] HalError),
}

pub type VqaResult<T> = Result<T, VqaError>;
