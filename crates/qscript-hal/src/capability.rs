//! What a backend can run.

use serde::{Deserialize, Serialize};

use qscript_ir::Circuit;

use crate::backend::ValidationResult;
use crate::error::{HalError, HalResult};

/// Static description of a backend, fixed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub name: String,
    pub num_qubits: u32,
    pub gate_set: GateSet,
    /// Upper bound on shots per job.
    pub max_shots: u32,
    pub is_simulator: bool,
}

impl Capabilities {
    /// Local statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::standard(),
            max_shots: 1_000_000,
            is_simulator: true,
        }
    }

    /// Rigetti superconducting QPU behind Braket.
    pub fn braket_rigetti(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::rigetti(),
            max_shots: 100_000,
            is_simulator: false,
        }
    }

    /// IonQ trapped-ion QPU behind Braket.
    pub fn braket_ionq(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::ionq(),
            max_shots: 100_000,
            is_simulator: false,
        }
    }

    /// Braket managed simulators (SV1, DM1, TN1).
    pub fn braket_simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::standard(),
            max_shots: 100_000,
            is_simulator: true,
        }
    }

    /// Check a circuit against the register size and gate set.
    pub fn check(&self, circuit: &Circuit) -> ValidationResult {
        let mut reasons = Vec::new();

        if circuit.num_qubits() > self.num_qubits as usize {
            reasons.push(format!(
                "Circuit requires {} qubits but {} only has {}",
                circuit.num_qubits(),
                self.name,
                self.num_qubits
            ));
        }

        for inst in circuit.instructions() {
            if let Some(gate) = inst.as_gate() {
                if !self.gate_set.contains(gate.name()) {
                    reasons.push(format!("Unsupported gate: {}", gate.name()));
                    break;
                }
                if gate.is_parameterized() {
                    reasons.push(format!("Unbound parameter in gate: {}", gate.name()));
                    break;
                }
            }
        }

        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }

    /// Reject zero shots and anything above `max_shots`.
    pub fn check_shots(&self, shots: u32) -> HalResult<()> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shot count must be positive".into()));
        }
        if shots > self.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} exceeds the {} limit of {}",
                self.name, self.max_shots
            )));
        }
        Ok(())
    }
}

/// Gates a backend accepts.
///
/// `native` lists the subset that runs without the provider's compiler
/// rewriting it. When `native` is empty every supported gate is native.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    pub single_qubit: Vec<String>,
    pub two_qubit: Vec<String>,
    pub native: Vec<String>,
}

impl GateSet {
    /// Every gate the circuit IR can express.
    pub fn standard() -> Self {
        Self {
            single_qubit: ["id", "x", "y", "z", "h", "s", "sdg", "rx", "ry", "rz"]
                .map(String::from)
                .to_vec(),
            two_qubit: vec!["cx".into(), "cz".into()],
            native: vec![],
        }
    }

    /// Rigetti: Braket accepts the standard set and compiles to `rx`/`rz`/`cz`.
    pub fn rigetti() -> Self {
        Self {
            native: vec!["rx".into(), "rz".into(), "cz".into()],
            ..Self::standard()
        }
    }

    /// IonQ: the standard set, compiled to GPi/GPi2/MS by the provider.
    pub fn ionq() -> Self {
        Self {
            native: vec!["gpi".into(), "gpi2".into(), "ms".into()],
            ..Self::standard()
        }
    }

    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }

    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qscript_ir::{ParameterExpression, QubitId};

    #[test]
    fn test_simulator_accepts_bell_pair() {
        let caps = Capabilities::simulator(4);
        assert!(caps.check(&Circuit::bell_pair().unwrap()).is_valid());
        assert!(caps.gate_set.is_native("cx"));
    }

    #[test]
    fn test_check_rejects_oversized_and_unbound() {
        let caps = Capabilities::simulator(1);
        let result = caps.check(&Circuit::bell_pair().unwrap());
        assert!(!result.is_valid());

        let mut ansatz = Circuit::with_size("ansatz", 1, 0);
        ansatz
            .rx(ParameterExpression::symbol("t"), QubitId(0))
            .unwrap();
        match caps.check(&ansatz) {
            ValidationResult::Invalid { reasons } => {
                assert!(reasons[0].contains("Unbound parameter"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_shot_limits() {
        let caps = Capabilities::braket_rigetti("Aspen-9", 32);
        assert!(caps.check_shots(1000).is_ok());
        assert!(matches!(caps.check_shots(0), Err(HalError::InvalidShots(_))));
        assert!(matches!(
            caps.check_shots(100_001),
            Err(HalError::InvalidShots(_))
        ));
        assert!(!caps.gate_set.is_native("cx"));
        assert!(caps.gate_set.contains("cx"));
    }
}
