//! Circuit representation for qscript.
//!
//! Circuits here are small and linear: an ordered list of instructions over
//! a fixed register, validated as they are appended. The same crate holds
//! the Pauli-string observables that cost functions and tomography measure.
//!
//! # Example: Bell pair
//!
//! ```rust
//! use qscript_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Example: Variational ansatz
//!
//! ```rust
//! use qscript_ir::{Circuit, ParameterExpression, QubitId};
//! use rustc_hash::FxHashMap;
//!
//! let mut ansatz = Circuit::with_size("ansatz", 1, 0);
//! ansatz.rx(ParameterExpression::symbol("theta_0"), QubitId(0)).unwrap();
//! ansatz.ry(ParameterExpression::symbol("theta_1"), QubitId(0)).unwrap();
//!
//! let values: FxHashMap<String, f64> =
//!     [("theta_0".to_string(), 0.1), ("theta_1".to_string(), 0.2)].into_iter().collect();
//! assert!(!ansatz.bind(&values).is_parameterized());
//! ```
//!
//! # Bit order
//!
//! Wherever a bitstring or Pauli label is written out, position `k` refers
//! to qubit (or classical bit) `k`: the leftmost character is index 0.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod observable;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use observable::{Observable, ObservableTerm, PauliOp, PauliString};
pub use parameter::ParameterExpression;
pub use qubit::{ClbitId, QubitId};
