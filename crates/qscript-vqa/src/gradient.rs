//! Gradient estimators.
//!
//! For a gate U(θ) = exp(-iθG/2) whose generator has eigenvalues ±1
//! (RX, RY, RZ), the parameter-shift rule is exact:
//!
//!   ∂f/∂θᵢ = [f(θ + s·eᵢ) − f(θ − s·eᵢ)] / (2 sin s)
//!
//! which for s = π/2 reduces to half the difference. Central finite
//! differences are kept for comparison.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cost::CostFunction;
use crate::error::{VqaError, VqaResult};

#[async_trait]
pub trait Gradient: Send + Sync {
    /// ∇f at `params`.
    async fn gradient(&self, cost: &CostFunction, params: &[f64]) -> VqaResult<Vec<f64>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Two-point shift rule, exact for Pauli-rotation generators.
#[derive(Debug, Clone, Copy)]
pub struct ParameterShift {
    shift: f64,
}

impl Default for ParameterShift {
    fn default() -> Self {
        Self { shift: FRAC_PI_2 }
    }
}

impl ParameterShift {
    /// `shift` must not be a multiple of π.
    pub fn with_shift(shift: f64) -> VqaResult<Self> {
        if !shift.is_finite() || shift.sin().abs() < 1e-9 {
            return Err(VqaError::InvalidSetting(format!(
                "parameter shift {shift} has sin(s) = 0"
            )));
        }
        Ok(Self { shift })
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }
}

#[async_trait]
impl Gradient for ParameterShift {
    async fn gradient(&self, cost: &CostFunction, params: &[f64]) -> VqaResult<Vec<f64>> {
        let denom = 2.0 * self.shift.sin();
        let mut grad = Vec::with_capacity(params.len());
        for i in 0..params.len() {
            let mut plus = params.to_vec();
            let mut minus = params.to_vec();
            plus[i] += self.shift;
            minus[i] -= self.shift;
            let f_plus = cost.evaluate(&plus).await?;
            let f_minus = cost.evaluate(&minus).await?;
            grad.push((f_plus - f_minus) / denom);
        }
        Ok(grad)
    }

    fn name(&self) -> &'static str {
        "parameter-shift"
    }
}

/// Central difference [f(θ + ε·eᵢ) − f(θ − ε·eᵢ)] / 2ε.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifference {
    epsilon: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self { epsilon: 1e-4 }
    }
}

impl FiniteDifference {
    pub fn with_epsilon(epsilon: f64) -> VqaResult<Self> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(VqaError::InvalidSetting(format!(
                "finite-difference epsilon must be positive, got {epsilon}"
            )));
        }
        Ok(Self { epsilon })
    }
}

#[async_trait]
impl Gradient for FiniteDifference {
    async fn gradient(&self, cost: &CostFunction, params: &[f64]) -> VqaResult<Vec<f64>> {
        let mut grad = Vec::with_capacity(params.len());
        for i in 0..params.len() {
            let mut plus = params.to_vec();
            let mut minus = params.to_vec();
            plus[i] += self.epsilon;
            minus[i] -= self.epsilon;
            let diff = cost.evaluate(&plus).await? - cost.evaluate(&minus).await?;
            grad.push(diff / (2.0 * self.epsilon));
        }
        Ok(grad)
    }

    fn name(&self) -> &'static str {
        "finite-difference"
    }
}

/// Gradient selection as it appears in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientMethod {
    #[default]
    ParameterShift,
    FiniteDifference,
}

impl GradientMethod {
    pub fn build(self) -> Box<dyn Gradient> {
        match self {
            GradientMethod::ParameterShift => Box::new(ParameterShift::default()),
            GradientMethod::FiniteDifference => Box::new(FiniteDifference::default()),
        }
    }
}

impl FromStr for GradientMethod {
    type Err = VqaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "parameter-shift" | "shift" => Ok(GradientMethod::ParameterShift),
            "finite-difference" | "fd" => Ok(GradientMethod::FiniteDifference),
            _ => Err(VqaError::UnknownGradient(s.to_string())),
        }
    }
}

impl fmt::Display for GradientMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradientMethod::ParameterShift => write!(f, "parameter-shift"),
            GradientMethod::FiniteDifference => write!(f, "finite-difference"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansatz::VariationalCircuit;
    use qscript_adapter_sim::SimulatorBackend;
    use std::sync::Arc;

    fn z_cost() -> CostFunction {
        CostFunction::pauli_z(
            VariationalCircuit::single_qubit().unwrap(),
            Arc::new(SimulatorBackend::new()),
        )
    }

    fn analytic(t0: f64, t1: f64) -> [f64; 2] {
        [-t0.sin() * t1.cos(), -t0.cos() * t1.sin()]
    }

    #[tokio::test]
    async fn test_parameter_shift_is_exact() {
        let cost = z_cost();
        for (t0, t1) in [(0.3, 1.2), (-2.0, 0.4), (1.0, 3.0)] {
            let grad = ParameterShift::default()
                .gradient(&cost, &[t0, t1])
                .await
                .unwrap();
            let expected = analytic(t0, t1);
            assert!((grad[0] - expected[0]).abs() < 1e-12);
            assert!((grad[1] - expected[1]).abs() < 1e-12);
        }
        assert_eq!(cost.evaluations(), 3 * 4);
    }

    #[tokio::test]
    async fn test_general_shift_matches_half_pi() {
        let cost = z_cost();
        let shifted = ParameterShift::with_shift(0.3)
            .unwrap()
            .gradient(&cost, &[0.8, -0.6])
            .await
            .unwrap();
        let expected = analytic(0.8, -0.6);
        assert!((shifted[0] - expected[0]).abs() < 1e-12);
        assert!((shifted[1] - expected[1]).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_finite_difference_is_close() {
        let cost = z_cost();
        let grad = FiniteDifference::default()
            .gradient(&cost, &[0.3, 1.2])
            .await
            .unwrap();
        let expected = analytic(0.3, 1.2);
        assert!((grad[0] - expected[0]).abs() < 1e-6);
        assert!((grad[1] - expected[1]).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_origin_is_stationary() {
        let grad = ParameterShift::default()
            .gradient(&z_cost(), &[0.0, 0.0])
            .await
            .unwrap();
        assert!(grad.iter().all(|g| g.abs() < 1e-12));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(ParameterShift::with_shift(std::f64::consts::PI).is_err());
        assert!(ParameterShift::with_shift(0.0).is_err());
        assert!(FiniteDifference::with_epsilon(0.0).is_err());
        assert!(FiniteDifference::with_epsilon(f64::NAN).is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "parameter-shift".parse::<GradientMethod>().unwrap(),
            GradientMethod::ParameterShift
        );
        assert_eq!(
            "Finite_Difference".parse::<GradientMethod>().unwrap(),
            GradientMethod::FiniteDifference
        );
        assert!("adam".parse::<GradientMethod>().is_err());
        assert_eq!(GradientMethod::FiniteDifference.to_string(), "finite-difference");
        assert_eq!(GradientMethod::default().build().name(), "parameter-shift");
    }
}
