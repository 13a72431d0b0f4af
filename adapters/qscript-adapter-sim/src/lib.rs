//! Local statevector simulator for qscript.
//!
//! Exact full-statevector simulation, practical up to about 20 qubits.
//! [`SimulatorBackend`] implements both [`Backend`](qscript_hal::Backend),
//! returning sampled counts, and [`Estimator`](qscript_hal::Estimator),
//! returning noise-free expectation values.
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//!
//! # Example
//!
//! ```no_run
//! use qscript_adapter_sim::SimulatorBackend;
//! use qscript_hal::Backend;
//! use qscript_ir::Circuit;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SimulatorBackend::new().with_seed(7);
//! let result = backend.run(&Circuit::coin_flip()?, 1000).await?;
//! println!("{:?}", result.counts.to_ordered());
//! # Ok(())
//! # }
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
pub use statevector::Statevector;
