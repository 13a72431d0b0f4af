//! Backend abstraction for qscript.
//!
//! The three procedures talk to execution targets only through this crate:
//! - [`Backend`]: submit → poll → fetch lifecycle, shared by the local
//!   simulator and Amazon Braket
//! - [`Estimator`]: expectation values of [`qscript_ir::Observable`]s
//! - [`Counts`] / [`ExecutionResult`]: what a finished job returns
//!
//! # Example
//!
//! ```ignore
//! use qscript_hal::Backend;
//! use qscript_adapter_sim::SimulatorBackend;
//! use qscript_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new();
//!     let job_id = backend.submit(&Circuit::coin_flip()?, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!     println!("{:?}", result.counts.to_ordered());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod estimator;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, ValidationResult, WaitPolicy};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use estimator::{Estimator, SampledEstimator, check_estimable};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
