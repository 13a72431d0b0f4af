//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qscript_hal::{
    Backend, BackendAvailability, Capabilities, Counts, Estimator, ExecutionResult, HalError,
    HalResult, Job, JobId, JobStatus, check_estimable,
};
use qscript_ir::{Circuit, InstructionKind, Observable};

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 20;

struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local statevector simulator.
///
/// Jobs run to completion inside [`submit`](Backend::submit), so the first
/// status poll already reports `Completed`. The state is simulated once per
/// job and the requested number of shots is sampled from it.
pub struct SimulatorBackend {
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    rng: Mutex<StdRng>,
}

impl SimulatorBackend {
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            capabilities: Capabilities::simulator(max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sampling.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    fn check_width(&self, circuit: &Circuit) -> HalResult<()> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let readout = Readout::from_circuit(circuit)?;
        let sv = Statevector::from_circuit(circuit)?;
        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.len(),
            "state prepared"
        );

        let mut tallies: FxHashMap<usize, u64> = FxHashMap::default();
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            for _ in 0..shots {
                *tallies.entry(sv.sample(&mut *rng)).or_insert(0) += 1;
            }
        }

        let counts: Counts = tallies
            .into_iter()
            .map(|(outcome, n)| (readout.bitstring(&sv, outcome), n))
            .collect();

        let elapsed = start.elapsed();
        debug!(?elapsed, outcomes = counts.len(), "simulation completed");
        Ok(ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Which qubit feeds each classical bit.
///
/// Circuits without measurements read out every qubit in order.
enum Readout {
    AllQubits,
    Clbits(Vec<Option<usize>>),
}

impl Readout {
    fn from_circuit(circuit: &Circuit) -> HalResult<Self> {
        if !circuit.has_measurements() {
            return Ok(Readout::AllQubits);
        }

        let mut sources = vec![None; circuit.num_clbits()];
        let mut measured = vec![false; circuit.num_qubits()];
        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        sources[c.index()] = Some(q.index());
                        measured[q.index()] = true;
                    }
                }
                InstructionKind::Gate(gate) => {
                    if let Some(q) = inst.qubits.iter().find(|q| measured[q.index()]) {
                        return Err(HalError::InvalidCircuit(format!(
                            "gate '{}' acts on {q} after it was measured",
                            gate.name()
                        )));
                    }
                }
                InstructionKind::Barrier => {}
            }
        }
        Ok(Readout::Clbits(sources))
    }

    fn bitstring(&self, sv: &Statevector, outcome: usize) -> String {
        match self {
            Readout::AllQubits => sv.outcome_to_bitstring(outcome),
            Readout::Clbits(sources) => sources
                .iter()
                .map(|src| match src {
                    Some(q) if outcome & (1 << *q) != 0 => '1',
                    _ => '0',
                })
                .collect(),
        }
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        self.capabilities.check_shots(shots)?;
        self.check_width(circuit)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let result = self.run_simulation(circuit, shots)?;

        let mut job = Job::new(job_id.clone(), shots, self.name());
        job.transition(JobStatus::Running);
        job.transition(JobStatus::Completed);

        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                job_id.0.clone(),
                SimJob {
                    job,
                    result: Some(result),
                },
            );

        debug!(job = %job_id, "submitted");
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match &sim_job.job.status {
            JobStatus::Completed => sim_job
                .result
                .clone()
                .ok_or_else(|| HalError::JobNotReady(job_id.0.clone())),
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg.clone())),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            JobStatus::Queued | JobStatus::Running => Err(HalError::JobNotReady(job_id.0.clone())),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        sim_job.job.transition(JobStatus::Cancelled);
        Ok(())
    }
}

/// Exact expectation values straight from the state vector, no shot noise.
#[async_trait]
impl Estimator for SimulatorBackend {
    async fn estimate(&self, circuit: &Circuit, observable: &Observable) -> HalResult<f64> {
        check_estimable(circuit, observable)?;
        self.check_width(circuit)?;
        let sv = Statevector::from_circuit(circuit)?;
        let value = observable
            .terms()
            .iter()
            .map(|term| term.coeff * sv.expectation(&term.pauli))
            .sum();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qscript_hal::SampledEstimator;
    use qscript_ir::{ClbitId, ParameterExpression, QubitId};

    #[test]
    fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert_eq!(backend.name(), "simulator");
    }

    #[tokio::test]
    async fn test_coin_flip_counts() {
        let backend = SimulatorBackend::new().with_seed(42);
        let result = backend.run(&Circuit::coin_flip().unwrap(), 1000).await.unwrap();

        assert_eq!(result.shots, 1000);
        assert_eq!(result.counts.total_shots(), 1000);
        assert!(result.counts.iter().all(|(k, _)| k == "0" || k == "1"));
        let p0 = result.counts.probability("0");
        assert!((p0 - 0.5).abs() < 0.08, "p(0) = {p0}");
    }

    #[tokio::test]
    async fn test_bell_pair_reads_all_qubits() {
        let backend = SimulatorBackend::new().with_seed(1);
        let job_id = backend
            .submit(&Circuit::bell_pair().unwrap(), 1000)
            .await
            .unwrap();
        assert!(backend.status(&job_id).await.unwrap().is_success());

        let counts = backend.result(&job_id).await.unwrap().counts;
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_seed_reproduces_counts() {
        let circuit = Circuit::coin_flip().unwrap();
        let a = SimulatorBackend::new().with_seed(9).run(&circuit, 500).await.unwrap();
        let b = SimulatorBackend::new().with_seed(9).run(&circuit, 500).await.unwrap();
        assert_eq!(a.counts, b.counts);
    }

    #[tokio::test]
    async fn test_measurement_into_selected_clbit() {
        let mut circuit = Circuit::with_size("swap_readout", 2, 3);
        circuit
            .x(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(2))
            .unwrap()
            .measure(QubitId(1), ClbitId(0))
            .unwrap();
        let result = SimulatorBackend::new().run(&circuit, 10).await.unwrap();
        assert_eq!(result.counts.get("001"), 10);
    }

    #[tokio::test]
    async fn test_gate_after_measure_is_rejected() {
        let mut circuit = Circuit::with_size("mid", 1, 1);
        circuit
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .h(QubitId(0))
            .unwrap();
        let err = SimulatorBackend::new().submit(&circuit, 10).await.unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(_)));
    }

    #[tokio::test]
    async fn test_submit_limits() {
        let backend = SimulatorBackend::with_max_qubits(5);
        let wide = Circuit::with_size("test", 10, 0);
        assert!(matches!(
            backend.submit(&wide, 100).await,
            Err(HalError::CircuitTooLarge(_))
        ));
        assert!(matches!(
            backend.submit(&Circuit::coin_flip().unwrap(), 0).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        let missing = JobId::new("nope");
        assert!(matches!(
            backend.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(matches!(
            backend.cancel(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_after_completion_keeps_result() {
        let backend = SimulatorBackend::new();
        let job_id = backend
            .submit(&Circuit::coin_flip().unwrap(), 10)
            .await
            .unwrap();
        backend.cancel(&job_id).await.unwrap();
        assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);
        assert!(backend.result(&job_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_exact_estimate() {
        let backend = SimulatorBackend::new();
        let mut circuit = Circuit::with_size("ansatz", 1, 0);
        circuit.rx(0.4, QubitId(0)).unwrap().ry(1.3, QubitId(0)).unwrap();
        let value = backend.estimate(&circuit, &Observable::z(0)).await.unwrap();
        assert!((value - 0.4_f64.cos() * 1.3_f64.cos()).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_estimate_rejects_unbound() {
        let backend = SimulatorBackend::new();
        let mut circuit = Circuit::with_size("ansatz", 1, 0);
        circuit
            .rx(ParameterExpression::symbol("theta_0"), QubitId(0))
            .unwrap();
        let err = backend
            .estimate(&circuit, &Observable::z(0))
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Circuit(_)));
    }

    #[tokio::test]
    async fn test_sampled_estimate_tracks_exact() {
        let backend = Arc::new(SimulatorBackend::new().with_seed(3));
        let sampled = SampledEstimator::new(backend.clone(), 20_000);

        let bell = Circuit::bell_pair().unwrap();
        let xx = Observable::from_terms([(0.5, "XX".parse().unwrap())]);
        let exact = backend.estimate(&bell, &xx).await.unwrap();
        let noisy = sampled.estimate(&bell, &xx).await.unwrap();
        assert!((exact - 0.5).abs() < 1e-12);
        assert!((noisy - exact).abs() < 0.05, "sampled {noisy}");
    }
}
