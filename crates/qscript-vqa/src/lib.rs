//! Variational optimization for qscript.
//!
//! A two-parameter RX·RY ansatz, a cost function that asks an
//! [`Estimator`](qscript_hal::Estimator) for ⟨Z⟩, gradients by the
//! parameter-shift rule, and plain fixed-step gradient descent.
//!
//! ```no_run
//! use std::sync::Arc;
//! use qscript_adapter_sim::SimulatorBackend;
//! use qscript_vqa::{CostFunction, GradientDescent, VariationalCircuit, DEFAULT_INITIAL_PARAMS};
//!
//! # async fn demo() -> Result<(), qscript_vqa::VqaError> {
//! let cost = CostFunction::pauli_z(
//!     VariationalCircuit::single_qubit()?,
//!     Arc::new(SimulatorBackend::new()),
//! );
//! let result = GradientDescent::default()
//!     .minimize(&cost, &DEFAULT_INITIAL_PARAMS)
//!     .await?;
//! println!("Final result: {}", result.cost);
//! # Ok(())
//! # }
//! ```

mod ansatz;
mod cost;
mod error;
mod gradient;
mod optimizer;

pub use ansatz::VariationalCircuit;
pub use cost::{CostFunction, EstimationMode};
pub use error::{VqaError, VqaResult};
pub use gradient::{FiniteDifference, Gradient, GradientMethod, ParameterShift};
pub use optimizer::{
    DEFAULT_INITIAL_PARAMS, DEFAULT_ITERATIONS, DEFAULT_STEP_SIZE, GradientDescent,
    OptimizationResult, StepReport,
};
