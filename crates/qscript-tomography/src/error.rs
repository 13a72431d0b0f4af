//! Error types for tomography.

use qscript_hal::HalError;
use qscript_ir::IrError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TomographyError {
    /// Setting count grows as 3ⁿ (state) or 12ⁿ (process).
    #[error("{kind} tomography supports at most {max} qubits, circuit has {num_qubits}")]
    TooManyQubits {
        kind: &'static str,
        num_qubits: usize,
        max: usize,
    },

    #[error("Invalid tomography circuit: {0}")]
    InvalidCircuit(String),

    /// Setting label of the job that came back without shots.
    #[error("Measurement setting {0} returned no shots")]
    EmptyCounts(String),

    #[error("Matrix is not a valid {0}")]
    InvalidMatrix(String),

    #[error("Eigendecomposition failed: {0}")]
    Eigendecomposition(String),

    #[error("Unknown tomography mode '{0}' (expected state or process)")]
    UnknownMode(String),

    #[error("Circuit construction failed: {0}")]
    Circuit(#[from] IrError),

    #[error("Execution failed: {0}")]
    Execution(#[from] HalError),
}

pub type TomographyResult<T> = Result<T, TomographyError>;
