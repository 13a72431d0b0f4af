//! Process tomography via the Choi matrix.
//!
//! Each qubit is prepared in one of |0⟩, |1⟩, |+⟩, |+i⟩ before the
//! process runs, and the output of every one of the 4ⁿ product inputs is
//! reconstructed with [`StateTomography`]. The four single-qubit inputs
//! span all 2×2 matrices, so every matrix unit |i⟩⟨j| has a fixed
//! expansion in them and, by linearity,
//!
//! ```text
//!   J = Σ_ij |i⟩⟨j| ⊗ E(|i⟩⟨j|)
//! ```
//!
//! The estimate reported is J / 2ⁿ, a 2n-qubit density matrix whose basis
//! index is `input * 2ⁿ + output`: output wires are qubits `0..n` and
//! input wires `n..2n`.

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use tracing::{info, instrument};

use qscript_hal::Backend;
use qscript_ir::{Circuit, QubitId};

use crate::density::DensityMatrix;
use crate::error::TomographyResult;
use crate::state::{StateTomography, check_preparation};

/// Largest register accepted by [`ProcessTomography`].
pub const MAX_PROCESS_QUBITS: usize = 3;

/// Single-qubit input state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Zero,
    One,
    Plus,
    PlusI,
}

impl InputState {
    pub const ALL: [InputState; 4] = [
        InputState::Zero,
        InputState::One,
        InputState::Plus,
        InputState::PlusI,
    ];

    /// Append the gates preparing this state from |0⟩.
    pub fn prepare(self, circuit: &mut Circuit, qubit: QubitId) -> TomographyResult<()> {
        match self {
            InputState::Zero => {}
            InputState::One => {
                circuit.x(qubit)?;
            }
            InputState::Plus => {
                circuit.h(qubit)?;
            }
            InputState::PlusI => {
                circuit.h(qubit)?.s(qubit)?;
            }
        }
        Ok(())
    }

    /// Weight of this state in the expansion of |row⟩⟨col|.
    fn weight(self, row: usize, col: usize) -> Complex64 {
        let half = |re: f64, im: f64| Complex64::new(re / 2.0, im / 2.0);
        match (row, col, self) {
            (0, 0, InputState::Zero) | (1, 1, InputState::One) => Complex64::new(1.0, 0.0),
            (0, 1, InputState::Zero | InputState::One) => half(-1.0, -1.0),
            (1, 0, InputState::Zero | InputState::One) => half(-1.0, 1.0),
            (0, 1, InputState::Plus) | (1, 0, InputState::Plus) => Complex64::new(1.0, 0.0),
            (0, 1, InputState::PlusI) => Complex64::new(0.0, 1.0),
            (1, 0, InputState::PlusI) => Complex64::new(0.0, -1.0),
            _ => Complex64::new(0.0, 0.0),
        }
    }

    fn label(self) -> &'static str {
        match self {
            InputState::Zero => "0",
            InputState::One => "1",
            InputState::Plus => "+",
            InputState::PlusI => "+i",
        }
    }
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}>", self.label())
    }
}

/// The 4ⁿ product inputs, qubit 0 varying slowest.
pub fn input_states(num_qubits: usize) -> Vec<Vec<InputState>> {
    let mut inputs = vec![Vec::with_capacity(num_qubits)];
    for _ in 0..num_qubits {
        inputs = inputs
            .into_iter()
            .flat_map(|prefix| {
                InputState::ALL.iter().map(move |&s| {
                    let mut next = prefix.clone();
                    next.push(s);
                    next
                })
            })
            .collect();
    }
    inputs
}

/// Outcome of a process-tomography run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessEstimate {
    /// Linear-inversion J / 2ⁿ before projection.
    #[serde(skip)]
    pub raw: Array2<Complex64>,
    /// Closest physical state to `raw`.
    pub choi: DensityMatrix,
    /// Qubits the process acts on.
    pub num_qubits: usize,
    pub jobs: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessTomography {
    shots: u32,
}

impl ProcessTomography {
    pub fn new(shots: u32) -> Self {
        Self { shots }
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// `process` preceded by the preparation of `inputs`.
    pub fn prepared(process: &Circuit, inputs: &[InputState]) -> TomographyResult<Circuit> {
        let n = process.num_qubits() as u32;
        let labels: String = inputs.iter().map(|s| s.label()).collect::<Vec<_>>().join(",");
        let mut circuit = Circuit::with_size(format!("{}[{labels}]", process.name()), n, 0);
        for (q, state) in inputs.iter().enumerate() {
            state.prepare(&mut circuit, QubitId(q as u32))?;
        }
        circuit.append(process)?;
        Ok(circuit)
    }

    pub async fn run(&self, backend: &dyn Backend, process: &Circuit) -> TomographyResult<ProcessEstimate> {
        self.run_with(backend, process, |_, _| {}).await
    }

    /// Like [`run`](Self::run), reporting `(completed, total)` jobs as it goes.
    #[instrument(skip_all, fields(backend = backend.name(), circuit = process.name(), shots = self.shots))]
    pub async fn run_with<F>(
        &self,
        backend: &dyn Backend,
        process: &Circuit,
        mut progress: F,
    ) -> TomographyResult<ProcessEstimate>
    where
        F: FnMut(usize, usize) + Send,
    {
        let n = check_preparation(process, "Process", MAX_PROCESS_QUBITS)?;
        let inputs = input_states(n);
        let settings_per_input = 3usize.pow(n as u32);
        let total = inputs.len() * settings_per_input;
        let state_tomography = StateTomography::new(self.shots);

        let mut outputs = Vec::with_capacity(inputs.len());
        for (k, input) in inputs.iter().enumerate() {
            let circuit = Self::prepared(process, input)?;
            let offset = k * settings_per_input;
            let estimate = state_tomography
                .run_with(backend, &circuit, |done, _| progress(offset + done, total))
                .await?;
            outputs.push(estimate.raw);
        }
        info!(inputs = inputs.len(), jobs = total, "process tomography measurements complete");

        let raw = assemble_choi(n, &inputs, &outputs);
        let choi = DensityMatrix::project(&raw)?;
        Ok(ProcessEstimate {
            raw,
            choi,
            num_qubits: n,
            jobs: total,
        })
    }
}

/// J / 2ⁿ from the output state of every input in [`input_states`] order.
pub fn assemble_choi(
    num_qubits: usize,
    inputs: &[Vec<InputState>],
    outputs: &[Array2<Complex64>],
) -> Array2<Complex64> {
    let d = 1usize << num_qubits;
    let mut choi = Array2::<Complex64>::zeros((d * d, d * d));

    for i in 0..d {
        for j in 0..d {
            let mut block = Array2::<Complex64>::zeros((d, d));
            for (input, output) in inputs.iter().zip(outputs) {
                let weight = input
                    .iter()
                    .enumerate()
                    .map(|(q, s)| s.weight((i >> q) & 1, (j >> q) & 1))
                    .product::<Complex64>();
                if weight.norm_sqr() > 0.0 {
                    block.scaled_add(weight, output);
                }
            }
            for k in 0..d {
                for l in 0..d {
                    choi[[i * d + k, j * d + l]] = block[[k, l]] / d as f64;
                }
            }
        }
    }
    choi
}
