//! Statevector simulation engine.
//!
//! Qubit `k` is bit `k` of a basis-state index, so index 1 is |q0=1⟩.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::PI;

use qscript_ir::{Circuit, IrResult, InstructionKind, PauliOp, PauliString, StandardGate};

/// Pure state of `num_qubits` qubits (2^n complex amplitudes).
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Run every gate of `circuit` on |0...0⟩.
    ///
    /// Measurements and barriers leave the state untouched; sampling is
    /// done afterwards. Fails on the first unbound rotation angle.
    pub fn from_circuit(circuit: &Circuit) -> IrResult<Self> {
        let mut sv = Self::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            if let InstructionKind::Gate(gate) = &inst.kind {
                let qubits: Vec<_> = inst.qubits.iter().map(|q| q.index()).collect();
                sv.apply_gate(gate, &qubits)?;
            }
        }
        Ok(sv)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply a standard gate to the given wires.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> IrResult<()> {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::Y => self.apply_y(qubits[0]),
            StandardGate::Z => self.apply_z(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::S => self.apply_phase(qubits[0], PI / 2.0),
            StandardGate::Sdg => self.apply_phase(qubits[0], -PI / 2.0),
            StandardGate::Rx(theta) => self.apply_rx(qubits[0], theta.evaluate()?),
            StandardGate::Ry(theta) => self.apply_ry(qubits[0], theta.evaluate()?),
            StandardGate::Rz(theta) => self.apply_rz(qubits[0], theta.evaluate()?),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
        }
        Ok(())
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = -i_val * b;
                self.amplitudes[j] = i_val * a;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    /// diag(1, e^{iφ}).
    fn apply_phase(&mut self, qubit: usize, phi: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, phi);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp = -*amp;
            }
        }
    }

    // =========================================================================
    // Readout
    // =========================================================================

    /// Born-rule probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// ⟨ψ|P|ψ⟩ computed from the action of P on basis states.
    ///
    /// P|i⟩ = phase(i) |i ⊕ flip⟩ where `flip` marks the X and Y factors.
    pub fn expectation(&self, pauli: &PauliString) -> f64 {
        let mut flip = 0usize;
        for &(q, op) in pauli.ops() {
            if matches!(op, PauliOp::X | PauliOp::Y) {
                flip |= 1 << q.index();
            }
        }

        let mut total = Complex64::new(0.0, 0.0);
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let mut phase = Complex64::new(1.0, 0.0);
            for &(q, op) in pauli.ops() {
                let set = i & (1 << q.index()) != 0;
                match op {
                    PauliOp::Y if set => phase *= Complex64::new(0.0, -1.0),
                    PauliOp::Y => phase *= Complex64::new(0.0, 1.0),
                    PauliOp::Z if set => phase = -phase,
                    PauliOp::I | PauliOp::X | PauliOp::Z => {}
                }
            }
            total += self.amplitudes[i ^ flip].conj() * phase * *amp;
        }
        total.re
    }

    /// Draw one basis-state index.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }
        // Rounding can leave the cumulative sum just under 1.
        self.amplitudes.len() - 1
    }

    /// Index as a bitstring with qubit 0 leftmost.
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        (0..self.num_qubits)
            .map(|q| if outcome & (1 << q) != 0 { '1' } else { '0' })
            .collect()
    }
}
