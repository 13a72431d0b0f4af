//! Gate set.
//!
//! Only the gates the three procedures and the tomography basis changes
//! need: Paulis, Hadamard, S/S†, single-axis rotations and the two
//! controlled Paulis used for entangling.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::IrResult;
use crate::parameter::ParameterExpression;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity. Kept as an explicit instruction so it shows up in emitted programs.
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    Rx(ParameterExpression),
    Ry(ParameterExpression),
    Rz(ParameterExpression),
    /// Controlled-NOT, operands are (control, target).
    CX,
    CZ,
}

impl StandardGate {
    /// OpenQASM 3 name of the gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
        }
    }

    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX | StandardGate::CZ => 2,
            _ => 1,
        }
    }

    /// The rotation angle, for parameterized gates.
    pub fn parameter(&self) -> Option<&ParameterExpression> {
        match self {
            StandardGate::Rx(p) | StandardGate::Ry(p) | StandardGate::Rz(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_parameterized(&self) -> bool {
        self.parameter().is_some_and(ParameterExpression::is_symbolic)
    }

    /// Copy of this gate with symbols substituted from `values`.
    pub fn bind(&self, values: &FxHashMap<String, f64>) -> Self {
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(p.bind(values)),
            StandardGate::Ry(p) => StandardGate::Ry(p.bind(values)),
            StandardGate::Rz(p) => StandardGate::Rz(p.bind(values)),
            other => other.clone(),
        }
    }

    /// Rotation angle as a number. Non-rotation gates return `Ok(None)`.
    pub fn angle(&self) -> IrResult<Option<f64>> {
        self.parameter().map(ParameterExpression::evaluate).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::I.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::Rx(0.3_f64.into()).num_qubits(), 1);
    }

    #[test]
    fn test_bind_rotation() {
        let gate = StandardGate::Ry(ParameterExpression::symbol("t"));
        assert!(gate.is_parameterized());
        assert!(gate.angle().is_err());

        let mut values = FxHashMap::default();
        values.insert("t".to_string(), 0.25);
        let bound = gate.bind(&values);
        assert!(!bound.is_parameterized());
        assert_eq!(bound.angle().unwrap(), Some(0.25));
        assert_eq!(StandardGate::H.angle().unwrap(), None);
    }
}
