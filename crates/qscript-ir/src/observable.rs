//! Observables as weighted sums of Pauli strings.
//!
//!   O = Σ_k  c_k · P_k
//!
//! where each P_k is a tensor product of single-qubit Pauli operators.
//! Labels are written with qubit 0 leftmost, the same order as measured
//! bitstrings, so `"ZI"` is Z on qubit 0.
//!
//! ```rust
//! use qscript_ir::{Observable, PauliString};
//!
//! let z0 = Observable::z(0);
//! assert_eq!(z0.min_qubits(), 1);
//!
//! let zz: PauliString = "ZZ".parse().unwrap();
//! assert_eq!(zz.eigenvalue("01"), -1.0);
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    I,
    X,
    Y,
    Z,
}

impl PauliOp {
    pub const ALL: [PauliOp; 4] = [PauliOp::I, PauliOp::X, PauliOp::Y, PauliOp::Z];

    /// 2x2 matrix, row-major.
    pub fn matrix(self) -> [[Complex64; 2]; 2] {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match self {
            PauliOp::I => [[l, o], [o, l]],
            PauliOp::X => [[o, l], [l, o]],
            PauliOp::Y => [[o, -i], [i, o]],
            PauliOp::Z => [[l, o], [o, -l]],
        }
    }

    pub fn label(self) -> char {
        match self {
            PauliOp::I => 'I',
            PauliOp::X => 'X',
            PauliOp::Y => 'Y',
            PauliOp::Z => 'Z',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(PauliOp::I),
            'X' => Some(PauliOp::X),
            'Y' => Some(PauliOp::Y),
            'Z' => Some(PauliOp::Z),
            _ => None,
        }
    }
}

/// A tensor product of Pauli operators.
///
/// Stored as a sorted list of non-identity factors; unlisted qubits are I.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    ops: Vec<(QubitId, PauliOp)>,
}

impl PauliString {
    /// Identities are dropped and the rest sorted by qubit.
    pub fn from_ops(ops: impl IntoIterator<Item = (QubitId, PauliOp)>) -> Self {
        let mut v: Vec<_> = ops.into_iter().filter(|(_, op)| *op != PauliOp::I).collect();
        v.sort_by_key(|(q, _)| *q);
        Self { ops: v }
    }

    pub fn identity() -> Self {
        Self { ops: vec![] }
    }

    pub fn single(qubit: u32, op: PauliOp) -> Self {
        Self::from_ops([(QubitId(qubit), op)])
    }

    pub fn ops(&self) -> &[(QubitId, PauliOp)] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// The factor acting on `qubit`.
    pub fn op_on(&self, qubit: QubitId) -> PauliOp {
        self.ops
            .iter()
            .find(|(q, _)| *q == qubit)
            .map_or(PauliOp::I, |(_, op)| *op)
    }

    pub fn max_qubit(&self) -> Option<QubitId> {
        self.ops.last().map(|(q, _)| *q)
    }

    /// Dense label over `num_qubits` wires, qubit 0 first.
    pub fn to_label(&self, num_qubits: u32) -> String {
        (0..num_qubits)
            .map(|q| self.op_on(QubitId(q)).label())
            .collect()
    }

    /// Gates rotating each factor's eigenbasis onto Z.
    ///
    /// X is measured after H, Y after S† then H. The returned circuit has
    /// no measurements.
    pub fn basis_change(&self, num_qubits: u32) -> IrResult<Circuit> {
        let mut circuit = Circuit::with_size("basis_change", num_qubits, 0);
        for &(qubit, op) in &self.ops {
            match op {
                PauliOp::X => {
                    circuit.h(qubit)?;
                }
                PauliOp::Y => {
                    circuit.sdg(qubit)?.h(qubit)?;
                }
                PauliOp::I | PauliOp::Z => {}
            }
        }
        Ok(circuit)
    }

    /// ±1 eigenvalue for a Z-basis outcome after [`basis_change`](Self::basis_change).
    ///
    /// Character `k` of `bits` is the outcome of qubit `k`. Qubits beyond
    /// the end of `bits` are read as 0.
    pub fn eigenvalue(&self, bits: &str) -> f64 {
        let bytes = bits.as_bytes();
        let ones = self
            .ops
            .iter()
            .filter(|(q, _)| bytes.get(q.index()) == Some(&b'1'))
            .count();
        if ones % 2 == 0 { 1.0 } else { -1.0 }
    }
}

impl FromStr for PauliString {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ops = s
            .chars()
            .enumerate()
            .map(|(i, c)| {
                PauliOp::from_char(c)
                    .map(|op| (QubitId(i as u32), op))
                    .ok_or_else(|| IrError::InvalidPauli(s.to_string()))
            })
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Self::from_ops(ops))
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "I");
        }
        let parts: Vec<_> = self
            .ops
            .iter()
            .map(|(q, op)| format!("{}{}", op.label(), q.0))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// One weighted Pauli term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableTerm {
    pub coeff: f64,
    pub pauli: PauliString,
}

/// A real linear combination of Pauli strings (Hermitian by construction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    terms: Vec<ObservableTerm>,
}

impl Observable {
    pub fn from_terms(terms: impl IntoIterator<Item = (f64, PauliString)>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|(coeff, pauli)| ObservableTerm { coeff, pauli })
                .collect(),
        }
    }

    /// Pauli-Z on a single qubit.
    pub fn z(qubit: u32) -> Self {
        Self::from_terms([(1.0, PauliString::single(qubit, PauliOp::Z))])
    }

    pub fn terms(&self) -> &[ObservableTerm] {
        &self.terms
    }

    /// Smallest register that holds every factor. Zero for a pure identity.
    pub fn min_qubits(&self) -> u32 {
        self.terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .max()
            .map_or(0, |q| q.0 + 1)
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self
            .terms
            .iter()
            .map(|t| format!("{}*{}", t.coeff, t.pauli))
            .collect();
        write!(f, "{}", parts.join(" + "))
    }
}
