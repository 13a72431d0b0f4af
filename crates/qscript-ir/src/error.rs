//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors raised while building circuits and observables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// An operand references a qubit outside the declared register.
    #[error("Qubit {qubit} out of range (circuit has {num_qubits} qubits){}", gate_context(.gate_name))]
    QubitNotFound {
        qubit: QubitId,
        num_qubits: u32,
        gate_name: Option<String>,
    },

    /// A measurement targets a classical bit outside the declared register.
    #[error("Classical bit {clbit} out of range (circuit has {num_clbits} bits){}", gate_context(.gate_name))]
    ClbitNotFound {
        clbit: ClbitId,
        num_clbits: u32,
        gate_name: Option<String>,
    },

    /// Gate arity does not match the operand list.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        gate_name: String,
        expected: u32,
        got: u32,
    },

    /// The same qubit appears twice in one instruction.
    #[error("Duplicate qubit {qubit} in operation{}", gate_context(.gate_name))]
    DuplicateQubit {
        qubit: QubitId,
        gate_name: Option<String>,
    },

    /// Measurement operand lists differ in length.
    #[error("Measurement maps {qubits} qubits onto {clbits} classical bits")]
    MeasureArity { qubits: usize, clbits: usize },

    /// A symbolic parameter has no value.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// A Pauli label could not be parsed.
    #[error("Invalid Pauli label '{0}'")]
    InvalidPauli(String),
}

#[allow(clippy::ref_option)]
fn gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
