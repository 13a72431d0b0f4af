//! Expectation-value estimation.
//!
//! An [`Estimator`] turns a state-preparation circuit and an observable into
//! ⟨O⟩. The local simulator implements it exactly from the state vector;
//! [`SampledEstimator`] works with any [`Backend`] by rotating each Pauli
//! term into the Z basis and averaging measured parities.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use qscript_ir::{Circuit, Observable, PauliString};

use crate::backend::Backend;
use crate::error::{HalError, HalResult};

#[async_trait]
pub trait Estimator: Send + Sync {
    /// ⟨observable⟩ in the state prepared by `circuit`.
    ///
    /// `circuit` must not contain measurements.
    async fn estimate(&self, circuit: &Circuit, observable: &Observable) -> HalResult<f64>;
}

/// Shot-based estimator on top of a backend.
pub struct SampledEstimator {
    backend: Arc<dyn Backend>,
    shots: u32,
}

impl SampledEstimator {
    pub fn new(backend: Arc<dyn Backend>, shots: u32) -> Self {
        Self { backend, shots }
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// `circuit`, then the basis change for `pauli`, then a full measurement.
    pub fn measurement_circuit(circuit: &Circuit, pauli: &PauliString) -> HalResult<Circuit> {
        let n = circuit.num_qubits() as u32;
        let name = format!("{}_{}", circuit.name(), pauli.to_label(n));
        let mut measured = Circuit::with_size(name, n, n);
        measured
            .append(circuit)?
            .append(&pauli.basis_change(n)?)?
            .measure_all()?;
        Ok(measured)
    }
}

/// Shared precondition of every estimator.
pub fn check_estimable(circuit: &Circuit, observable: &Observable) -> HalResult<()> {
    if circuit.has_measurements() {
        return Err(HalError::InvalidCircuit(
            "state preparation must not contain measurements".into(),
        ));
    }
    let needed = observable.min_qubits() as usize;
    if needed > circuit.num_qubits() {
        return Err(HalError::InvalidCircuit(format!(
            "observable acts on {needed} qubits but circuit has {}",
            circuit.num_qubits()
        )));
    }
    Ok(())
}

#[async_trait]
impl Estimator for SampledEstimator {
    async fn estimate(&self, circuit: &Circuit, observable: &Observable) -> HalResult<f64> {
        check_estimable(circuit, observable)?;

        let mut total = 0.0;
        for term in observable.terms() {
            if term.pauli.is_identity() {
                total += term.coeff;
                continue;
            }
            let measured = Self::measurement_circuit(circuit, &term.pauli)?;
            let result = self.backend.run(&measured, self.shots).await?;
            let value = result.counts.expectation(&term.pauli).ok_or_else(|| {
                HalError::Backend(format!("{} returned no shots", self.backend.name()))
            })?;
            debug!(term = %term.pauli, value, "sampled term");
            total += term.coeff * value;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qscript_ir::{Instruction, PauliOp};

    #[test]
    fn test_measurement_circuit_layout() {
        let bell = Circuit::bell_pair().unwrap();
        let xy: PauliString = "XY".parse().unwrap();
        let measured = SampledEstimator::measurement_circuit(&bell, &xy).unwrap();

        let names: Vec<_> = measured.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, vec!["h", "cx", "h", "sdg", "h", "measure"]);
        assert_eq!(measured.num_clbits(), 2);
        assert_eq!(measured.name(), "bell_pair_XY");
    }

    #[test]
    fn test_check_estimable() {
        let one = Circuit::with_size("one", 1, 0);
        let z1 = Observable::from_terms([(1.0, PauliString::single(1, PauliOp::Z))]);
        assert!(check_estimable(&one, &Observable::z(0)).is_ok());
        assert!(matches!(
            check_estimable(&one, &z1),
            Err(HalError::InvalidCircuit(_))
        ));

        let mut measured = Circuit::with_size("m", 1, 1);
        measured.measure_all().unwrap();
        assert!(check_estimable(&measured, &Observable::z(0)).is_err());
    }
}
