//! Cost function: ⟨O⟩ in the state prepared by the bound ansatz.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use qscript_hal::{Backend, Estimator, SampledEstimator};
use qscript_ir::Observable;

use crate::ansatz::VariationalCircuit;
use crate::error::VqaResult;

/// How expectation values are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    /// Exact expectation from a simulator's state vector.
    #[default]
    Analytic,
    /// Rotate into each term's eigenbasis, measure `shots` times and average.
    Sampled { shots: u32 },
}

impl EstimationMode {
    pub fn from_shots(shots: Option<u32>) -> Self {
        shots.map_or(EstimationMode::Analytic, |shots| EstimationMode::Sampled { shots })
    }

    /// Pick the estimator for this mode on `backend`.
    pub fn estimator<B>(self, backend: Arc<B>) -> Arc<dyn Estimator>
    where
        B: Backend + Estimator + 'static,
    {
        match self {
            EstimationMode::Analytic => backend as Arc<dyn Estimator>,
            EstimationMode::Sampled { shots } => Arc::new(SampledEstimator::new(backend, shots)),
        }
    }
}

/// f(θ) = ⟨observable⟩ after `ansatz(θ)`.
///
/// Counts every evaluation so optimizers can report their cost.
pub struct CostFunction {
    ansatz: VariationalCircuit,
    observable: Observable,
    estimator: Arc<dyn Estimator>,
    evaluations: AtomicUsize,
}

impl CostFunction {
    pub fn new(
        ansatz: VariationalCircuit,
        observable: Observable,
        estimator: Arc<dyn Estimator>,
    ) -> Self {
        Self {
            ansatz,
            observable,
            estimator,
            evaluations: AtomicUsize::new(0),
        }
    }

    /// ⟨Z⟩ on the ansatz's own wire.
    pub fn pauli_z(ansatz: VariationalCircuit, estimator: Arc<dyn Estimator>) -> Self {
        let observable = Observable::z(ansatz.qubit().0);
        Self::new(ansatz, observable, estimator)
    }

    pub fn ansatz(&self) -> &VariationalCircuit {
        &self.ansatz
    }

    pub fn observable(&self) -> &Observable {
        &self.observable
    }

    pub fn num_parameters(&self) -> usize {
        self.ansatz.num_parameters()
    }

    pub async fn evaluate(&self, params: &[f64]) -> VqaResult<f64> {
        let circuit = self.ansatz.bind(params)?;
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        Ok(self.estimator.estimate(&circuit, &self.observable).await?)
    }

    /// Calls to [`evaluate`](Self::evaluate) so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }
}
