//! The RX·RY variational circuit.

use rustc_hash::FxHashMap;

use qscript_ir::{Circuit, ParameterExpression, QubitId};

use crate::error::{VqaError, VqaResult};

/// `rx(θ₀) q; ry(θ₁) q` on one designated wire of a wider register.
///
/// The template keeps θ₀ and θ₁ as symbols; [`bind`](Self::bind) turns a
/// parameter vector into a concrete circuit. Wires other than `qubit` are
/// left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationalCircuit {
    template: Circuit,
    qubit: QubitId,
    names: Vec<String>,
}

impl VariationalCircuit {
    pub fn new(num_qubits: u32, qubit: QubitId) -> VqaResult<Self> {
        let names = vec!["theta_0".to_string(), "theta_1".to_string()];
        let mut template = Circuit::with_size("rx_ry_ansatz", num_qubits, 0);
        template
            .rx(ParameterExpression::symbol(&names[0]), qubit)?
            .ry(ParameterExpression::symbol(&names[1]), qubit)?;
        Ok(Self {
            template,
            qubit,
            names,
        })
    }

    /// One qubit, acting on q0.
    pub fn single_qubit() -> VqaResult<Self> {
        Self::new(1, QubitId(0))
    }

    pub fn qubit(&self) -> QubitId {
        self.qubit
    }

    pub fn num_parameters(&self) -> usize {
        self.names.len()
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.names
    }

    /// The symbolic circuit.
    pub fn template(&self) -> &Circuit {
        &self.template
    }

    /// Concrete circuit for `params`, in `parameter_names` order.
    pub fn bind(&self, params: &[f64]) -> VqaResult<Circuit> {
        if params.len() != self.names.len() {
            return Err(VqaError::ParameterCount {
                expected: self.names.len(),
                got: params.len(),
            });
        }
        let values: FxHashMap<String, f64> = self
            .names
            .iter()
            .cloned()
            .zip(params.iter().copied())
            .collect();
        Ok(self.template.bind(&values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qscript_ir::StandardGate;

    #[test]
    fn test_template_is_symbolic() {
        let ansatz = VariationalCircuit::single_qubit().unwrap();
        assert!(ansatz.template().is_parameterized());
        assert_eq!(ansatz.num_parameters(), 2);
        assert_eq!(ansatz.template().len(), 2);
    }

    #[test]
    fn test_bind_orders_rx_then_ry() {
        let ansatz = VariationalCircuit::new(3, QubitId(2)).unwrap();
        let circuit = ansatz.bind(&[0.25, -1.5]).unwrap();
        assert!(!circuit.is_parameterized());
        assert_eq!(circuit.num_qubits(), 3);

        let gates: Vec<_> = circuit
            .instructions()
            .iter()
            .map(|inst| (inst.as_gate().cloned(), inst.qubits.clone()))
            .collect();
        assert_eq!(
            gates,
            vec![
                (Some(StandardGate::Rx(0.25_f64.into())), vec![QubitId(2)]),
                (Some(StandardGate::Ry((-1.5_f64).into())), vec![QubitId(2)]),
            ]
        );
    }

    #[test]
    fn test_wrong_parameter_count() {
        let ansatz = VariationalCircuit::single_qubit().unwrap();
        assert!(matches!(
            ansatz.bind(&[0.1]),
            Err(VqaError::ParameterCount {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_qubit_out_of_range() {
        assert!(matches!(
            VariationalCircuit::new(1, QubitId(1)),
            Err(VqaError::Circuit(_))
        ));
    }

    #[test]
    fn test_same_params_same_circuit() {
        let ansatz = VariationalCircuit::single_qubit().unwrap();
        assert_eq!(ansatz.bind(&[0.3, 0.4]).unwrap(), ansatz.bind(&[0.3, 0.4]).unwrap());
    }
}
