//! Mode selection shared by the library entry point and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use qscript_hal::Backend;
use qscript_ir::Circuit;

use crate::density::DensityMatrix;
use crate::error::{TomographyError, TomographyResult};
use crate::process::{ProcessEstimate, ProcessTomography};
use crate::state::{StateEstimate, StateTomography};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TomographyMode {
    /// Reconstruct the state the circuit prepares from |0…0⟩.
    State,
    /// Reconstruct the channel the circuit implements.
    #[default]
    Process,
}

impl TomographyMode {
    /// Jobs a run submits for an `num_qubits`-qubit circuit.
    pub fn job_count(self, num_qubits: usize) -> usize {
        let n = num_qubits as u32;
        match self {
            TomographyMode::State => 3usize.pow(n),
            TomographyMode::Process => 12usize.pow(n),
        }
    }
}

impl FromStr for TomographyMode {
    type Err = TomographyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "state" => Ok(TomographyMode::State),
            "process" => Ok(TomographyMode::Process),
            _ => Err(TomographyError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for TomographyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomographyMode::State => write!(f, "state"),
            TomographyMode::Process => write!(f, "process"),
        }
    }
}

/// Result of [`run_tomography`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TomographyOutcome {
    State(StateEstimate),
    Process(ProcessEstimate),
}

impl TomographyOutcome {
    /// The reconstructed density matrix (the normalised Choi state for a process).
    pub fn matrix(&self) -> &DensityMatrix {
        match self {
            TomographyOutcome::State(estimate) => &estimate.state,
            TomographyOutcome::Process(estimate) => &estimate.choi,
        }
    }

    pub fn jobs(&self) -> usize {
        match self {
            TomographyOutcome::State(estimate) => estimate.jobs,
            TomographyOutcome::Process(estimate) => estimate.jobs,
        }
    }
}

/// Run `mode` tomography of `circuit` with `shots` per measurement setting.
pub async fn run_tomography<F>(
    mode: TomographyMode,
    backend: &dyn Backend,
    circuit: &Circuit,
    shots: u32,
    progress: F,
) -> TomographyResult<TomographyOutcome>
where
    F: FnMut(usize, usize) + Send,
{
    match mode {
        TomographyMode::State => StateTomography::new(shots)
            .run_with(backend, circuit, progress)
            .await
            .map(TomographyOutcome::State),
        TomographyMode::Process => ProcessTomography::new(shots)
            .run_with(backend, circuit, progress)
            .await
            .map(TomographyOutcome::Process),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qscript_adapter_sim::SimulatorBackend;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("state".parse::<TomographyMode>().unwrap(), TomographyMode::State);
        assert_eq!("Process".parse::<TomographyMode>().unwrap(), TomographyMode::Process);
        assert!(matches!(
            "shadow".parse::<TomographyMode>(),
            Err(TomographyError::UnknownMode(_))
        ));
        assert_eq!(TomographyMode::default().to_string(), "process");
    }

    #[test]
    fn test_job_count() {
        assert_eq!(TomographyMode::State.job_count(2), 9);
        assert_eq!(TomographyMode::Process.job_count(2), 144);
    }

    #[tokio::test]
    async fn test_run_state_mode() {
        let backend = SimulatorBackend::new().with_seed(3);
        let mut circuit = Circuit::with_size("plus", 1, 0);
        circuit.h(qscript_ir::QubitId(0)).unwrap();

        let outcome = run_tomography(TomographyMode::State, &backend, &circuit, 500, |_, _| {})
            .await
            .unwrap();
        assert_eq!(outcome.jobs(), 3);
        assert_eq!(outcome.matrix().num_qubits(), 1);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["mode"], "state");
        assert!((json["expectations"]["X"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    }
}
