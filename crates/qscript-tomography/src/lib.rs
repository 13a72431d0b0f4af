//! Quantum state and process tomography for qscript.
//!
//! Measurement circuits are run on any [`Backend`](qscript_hal::Backend),
//! the counts are inverted linearly into a density matrix and the result
//! is projected onto the nearest physical state.
//!
//! ```no_run
//! use qscript_adapter_sim::SimulatorBackend;
//! use qscript_ir::Circuit;
//! use qscript_tomography::StateTomography;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SimulatorBackend::new();
//! let estimate = StateTomography::new(1000)
//!     .run(&backend, &Circuit::bell_pair()?)
//!     .await?;
//! println!("{}", estimate.state);
//! # Ok(())
//! # }
//! ```

mod density;
mod error;
mod linalg;
mod mode;
mod process;
mod state;

pub use density::DensityMatrix;
pub use error::{TomographyError, TomographyResult};
pub use mode::{TomographyMode, TomographyOutcome, run_tomography};
pub use process::{
    InputState, MAX_PROCESS_QUBITS, ProcessEstimate, ProcessTomography, assemble_choi,
    input_states,
};
pub use state::{
    MAX_STATE_QUBITS, StateEstimate, StateTomography, measurement_settings, pauli_matrix,
    reconstruct,
};
