//! OpenQASM 3 serialization for qscript circuits.
//!
//! Remote backends accept programs as OpenQASM 3 text. This crate turns a
//! [`qscript_ir::Circuit`] into that text, either with the standard gate
//! library names or with the spellings Amazon Braket expects.
//!
//! ```rust
//! use qscript_ir::Circuit;
//! use qscript_qasm3::{Dialect, emit, emit_with};
//!
//! let bell = Circuit::bell_pair().unwrap();
//! assert!(emit(&bell).unwrap().contains("cx q[0], q[1];"));
//! assert!(emit_with(&bell, Dialect::Braket).unwrap().contains("cnot q[0], q[1];"));
//! ```

mod emitter;
mod error;

pub use emitter::{Dialect, emit, emit_with};
pub use error::{Qasm3Error, Qasm3Result};
