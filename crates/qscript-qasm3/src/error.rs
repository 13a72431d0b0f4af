//! Error types for the QASM3 emitter.

use thiserror::Error;

/// Errors that can occur while serializing a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Qasm3Error {
    /// The target dialect cannot accept free parameters.
    #[error("Parameter '{0}' must be bound before emitting for {1}")]
    UnboundParameter(String, &'static str),
}

/// Result type for emitter operations.
pub type Qasm3Result<T> = Result<T, Qasm3Error>;
