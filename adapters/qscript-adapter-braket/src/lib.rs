//! Amazon Braket backend for qscript.
//!
//! # Supported devices
//!
//! | Device | Qubits | Provider |
//! |--------|--------|----------|
//! | Rigetti Aspen-9 | 32 | Rigetti |
//! | Rigetti Ankaa-3 | 84 | Rigetti |
//! | IonQ Aria | 25 | IonQ |
//! | IonQ Forte | 36 | IonQ |
//! | Amazon SV1 | 34 | Amazon |
//! | Amazon DM1 | 17 | Amazon |
//!
//! Other ARNs work too; their capabilities come from `GetDevice`.
//!
//! # Authentication
//!
//! AWS credentials are loaded from the standard credential chain. Results
//! are written by Braket to S3, configured through [`BraketConfig`] or:
//! - `QSCRIPT_BRAKET_S3_BUCKET` (required)
//! - `QSCRIPT_BRAKET_S3_PREFIX` (default `"qscript-results"`)
//! - `AWS_REGION` (default `"us-east-1"`)
//!
//! # Example
//!
//! ```no_run
//! use qscript_adapter_braket::{BraketBackend, device};
//! use qscript_hal::Backend;
//! use qscript_ir::Circuit;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = BraketBackend::connect(device::RIGETTI_ASPEN_9).await?;
//! let result = backend.run(&Circuit::bell_pair()?, 1000).await?;
//! println!("{:?}", result.counts.to_ordered());
//! # Ok(())
//! # }
//! ```

mod api;
mod backend;
mod config;
pub mod device;
mod error;

pub use backend::BraketBackend;
pub use config::{BraketConfig, DEFAULT_REGION, DEFAULT_S3_PREFIX};
pub use error::{BraketError, BraketResult};
