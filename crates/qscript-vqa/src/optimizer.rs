//! Fixed-step gradient descent.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::cost::CostFunction;
use crate::error::{VqaError, VqaResult};
use crate::gradient::{Gradient, ParameterShift};

pub const DEFAULT_STEP_SIZE: f64 = 0.4;
pub const DEFAULT_ITERATIONS: usize = 100;

/// A nonzero starting point. At exactly [0, 0] the ⟨Z⟩ surface of the
/// RX·RY ansatz is stationary and descent never moves.
pub const DEFAULT_INITIAL_PARAMS: [f64; 2] = [0.011, 0.012];

/// Outcome of [`GradientDescent::minimize`].
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub params: Vec<f64>,
    /// Cost at `params`.
    pub cost: f64,
    /// Cost at the initial point and after every step.
    pub history: Vec<f64>,
    pub iterations: usize,
    /// Circuit evaluations spent, gradients included.
    pub evaluations: usize,
}

/// Progress report passed to the observer of
/// [`minimize_with`](GradientDescent::minimize_with).
#[derive(Debug, Clone)]
pub struct StepReport<'a> {
    pub iteration: usize,
    pub params: &'a [f64],
    pub cost: f64,
    pub gradient_norm: f64,
}

/// θ ← θ − η·∇f(θ), exactly `iterations` times.
///
/// There is no convergence test and no early exit.
pub struct GradientDescent {
    step_size: f64,
    iterations: usize,
    gradient: Box<dyn Gradient>,
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            iterations: DEFAULT_ITERATIONS,
            gradient: Box::new(ParameterShift::default()),
        }
    }
}

impl GradientDescent {
    pub fn new(step_size: f64, iterations: usize) -> VqaResult<Self> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(VqaError::InvalidSetting(format!(
                "step size must be positive, got {step_size}"
            )));
        }
        Ok(Self {
            step_size,
            iterations,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_gradient(mut self, gradient: Box<dyn Gradient>) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// One update. Returns the new parameters and the gradient used.
    pub async fn step(
        &self,
        cost: &CostFunction,
        params: &[f64],
    ) -> VqaResult<(Vec<f64>, Vec<f64>)> {
        let grad = self.gradient.gradient(cost, params).await?;
        let next = params
            .iter()
            .zip(&grad)
            .map(|(p, g)| p - self.step_size * g)
            .collect();
        Ok((next, grad))
    }

    pub async fn minimize(
        &self,
        cost: &CostFunction,
        initial: &[f64],
    ) -> VqaResult<OptimizationResult> {
        self.minimize_with(cost, initial, |_| {}).await
    }

    /// [`minimize`](Self::minimize), calling `observe` after every step.
    #[instrument(skip_all, fields(step_size = self.step_size, iterations = self.iterations, gradient = self.gradient.name()))]
    pub async fn minimize_with(
        &self,
        cost: &CostFunction,
        initial: &[f64],
        mut observe: impl FnMut(&StepReport<'_>) + Send,
    ) -> VqaResult<OptimizationResult> {
        if initial.len() != cost.num_parameters() {
            return Err(VqaError::ParameterCount {
                expected: cost.num_parameters(),
                got: initial.len(),
            });
        }
        let start_evaluations = cost.evaluations();

        let mut params = initial.to_vec();
        let mut current = cost.evaluate(&params).await?;
        let mut history = Vec::with_capacity(self.iterations + 1);
        history.push(current);

        for iteration in 1..=self.iterations {
            let (next, grad) = self.step(cost, &params).await?;
            params = next;
            current = cost.evaluate(&params).await?;
            history.push(current);

            let gradient_norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
            debug!(iteration, cost = current, gradient_norm, ?params, "step");
            observe(&StepReport {
                iteration,
                params: &params,
                cost: current,
                gradient_norm,
            });
        }

        let evaluations = cost.evaluations() - start_evaluations;
        info!(cost = current, ?params, evaluations, "optimization finished");

        Ok(OptimizationResult {
            params,
            cost: current,
            history,
            iterations: self.iterations,
            evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansatz::VariationalCircuit;
    use crate::gradient::GradientMethod;
    use qscript_adapter_sim::SimulatorBackend;
    use std::sync::Arc;

    fn z_cost() -> CostFunction {
        CostFunction::pauli_z(
            VariationalCircuit::single_qubit().unwrap(),
            Arc::new(SimulatorBackend::new()),
        )
    }

    #[tokio::test]
    async fn test_default_run_reaches_minimum() {
        let cost = z_cost();
        let result = GradientDescent::default()
            .minimize(&cost, &DEFAULT_INITIAL_PARAMS)
            .await
            .unwrap();

        assert!((result.cost + 1.0).abs() < 1e-3, "final cost {}", result.cost);
        assert_eq!(result.iterations, 100);
        assert_eq!(result.history.len(), 101);
        // one initial evaluation, then 4 for the gradient and 1 for the cost per step
        assert_eq!(result.evaluations, 1 + 100 * 5);
    }

    #[tokio::test]
    async fn test_origin_does_not_move() {
        let cost = z_cost();
        let result = GradientDescent::default()
            .minimize(&cost, &[0.0, 0.0])
            .await
            .unwrap();
        assert!(result.params.iter().all(|p| p.abs() < 1e-12));
        assert!((result.cost - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_single_step_update() {
        let cost = z_cost();
        let gd = GradientDescent::new(0.4, 1).unwrap();
        let (next, grad) = gd.step(&cost, &[0.5, 0.25]).await.unwrap();
        let expected_grad = [-0.5_f64.sin() * 0.25_f64.cos(), -0.5_f64.cos() * 0.25_f64.sin()];
        for i in 0..2 {
            assert!((grad[i] - expected_grad[i]).abs() < 1e-12);
        }
        assert!((next[0] - (0.5 - 0.4 * expected_grad[0])).abs() < 1e-12);
        assert!((next[1] - (0.25 - 0.4 * expected_grad[1])).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_exact_iteration_count_and_observer() {
        let cost = z_cost();
        let gd = GradientDescent::new(0.1, 7)
            .unwrap()
            .with_gradient(GradientMethod::FiniteDifference.build());
        let mut seen = Vec::new();
        let result = gd
            .minimize_with(&cost, &[1.0, 1.0], |report| seen.push(report.iteration))
            .await
            .unwrap();
        assert_eq!(seen, (1..=7).collect::<Vec<_>>());
        assert_eq!(result.history.len(), 8);
        assert!(result.cost < result.history[0]);
    }

    #[tokio::test]
    async fn test_zero_iterations_returns_start() {
        let cost = z_cost();
        let result = GradientDescent::new(0.4, 0)
            .unwrap()
            .minimize(&cost, &[0.3, 0.2])
            .await
            .unwrap();
        assert_eq!(result.params, vec![0.3, 0.2]);
        assert_eq!(result.evaluations, 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_settings() {
        assert!(GradientDescent::new(0.0, 10).is_err());
        assert!(GradientDescent::new(-0.4, 10).is_err());
        let err = GradientDescent::default()
            .minimize(&z_cost(), &[0.1])
            .await
            .unwrap_err();
        assert!(matches!(err, VqaError::ParameterCount { expected: 2, got: 1 }));
    }
}
