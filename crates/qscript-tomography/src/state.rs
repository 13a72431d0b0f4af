//! State tomography by Pauli-basis measurement and linear inversion.
//!
//! For n qubits every one of the 3ⁿ settings in {X, Y, Z}ⁿ is measured.
//! A setting's counts estimate every Pauli string obtained by replacing
//! some of its factors with I, so each of the 4ⁿ expectation values is
//! averaged over all settings that contain it. Then
//!
//! ```text
//!   ρ = 2⁻ⁿ · Σ_P ⟨P⟩ · P
//! ```

use std::collections::BTreeMap;

use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use tracing::{debug, info, instrument};

use qscript_hal::{Backend, Counts, SampledEstimator};
use qscript_ir::{Circuit, PauliOp, PauliString, QubitId};

use crate::density::DensityMatrix;
use crate::error::{TomographyError, TomographyResult};

/// Largest register accepted by [`StateTomography`].
pub const MAX_STATE_QUBITS: usize = 5;

const BASES: [PauliOp; 3] = [PauliOp::X, PauliOp::Y, PauliOp::Z];

/// The 3ⁿ measurement settings, qubit 0 varying slowest.
pub fn measurement_settings(num_qubits: usize) -> Vec<Vec<PauliOp>> {
    let mut settings = vec![Vec::with_capacity(num_qubits)];
    for _ in 0..num_qubits {
        settings = settings
            .into_iter()
            .flat_map(|prefix| {
                BASES.iter().map(move |&op| {
                    let mut next = prefix.clone();
                    next.push(op);
                    next
                })
            })
            .collect();
    }
    settings
}

/// Dense 2ⁿ×2ⁿ matrix of a Pauli string over `num_qubits` wires.
pub fn pauli_matrix(pauli: &PauliString, num_qubits: usize) -> Array2<Complex64> {
    let d = 1usize << num_qubits;
    let ops: Vec<PauliOp> = (0..num_qubits)
        .map(|q| pauli.op_on(QubitId(q as u32)))
        .collect();
    let flip = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| matches!(op, PauliOp::X | PauliOp::Y))
        .fold(0usize, |mask, (q, _)| mask | (1 << q));

    let mut m = Array2::zeros((d, d));
    for row in 0..d {
        let col = row ^ flip;
        let mut value = Complex64::new(1.0, 0.0);
        for (q, op) in ops.iter().enumerate() {
            let r = (row >> q) & 1;
            let c = (col >> q) & 1;
            value *= op.matrix()[r][c];
        }
        m[[row, col]] = value;
    }
    m
}

/// Outcome of a state-tomography run.
#[derive(Debug, Clone, Serialize)]
pub struct StateEstimate {
    /// Linear-inversion estimate before projection; may be unphysical.
    #[serde(skip)]
    pub raw: Array2<Complex64>,
    /// Closest physical density matrix to `raw`.
    pub state: DensityMatrix,
    /// ⟨P⟩ keyed by dense label, qubit 0 first.
    pub expectations: BTreeMap<String, f64>,
    /// Jobs submitted to the backend.
    pub jobs: usize,
}

/// Shot-based state tomography against any [`Backend`].
#[derive(Debug, Clone, Copy)]
pub struct StateTomography {
    shots: u32,
}

impl StateTomography {
    pub fn new(shots: u32) -> Self {
        Self { shots }
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// One measured circuit per setting, in [`measurement_settings`] order.
    pub fn circuits(&self, prep: &Circuit) -> TomographyResult<Vec<(PauliString, Circuit)>> {
        let n = check_preparation(prep, "State", MAX_STATE_QUBITS)?;
        measurement_settings(n)
            .into_iter()
            .map(|setting| {
                let pauli = setting_string(&setting);
                let circuit = SampledEstimator::measurement_circuit(prep, &pauli)?;
                Ok((pauli, circuit))
            })
            .collect()
    }

    pub async fn run(&self, backend: &dyn Backend, prep: &Circuit) -> TomographyResult<StateEstimate> {
        self.run_with(backend, prep, |_, _| {}).await
    }

    /// Like [`run`](Self::run), reporting `(completed, total)` jobs as it goes.
    #[instrument(skip_all, fields(backend = backend.name(), circuit = prep.name(), shots = self.shots))]
    pub async fn run_with<F>(
        &self,
        backend: &dyn Backend,
        prep: &Circuit,
        mut progress: F,
    ) -> TomographyResult<StateEstimate>
    where
        F: FnMut(usize, usize) + Send,
    {
        let n = prep.num_qubits();
        let circuits = self.circuits(prep)?;
        let total = circuits.len();
        let mut measured = Vec::with_capacity(total);

        for (done, (setting, circuit)) in circuits.into_iter().enumerate() {
            let result = backend.run(&circuit, self.shots).await?;
            debug!(setting = %setting.to_label(n as u32), shots = result.counts.total_shots(), "setting measured");
            measured.push((setting, result.counts));
            progress(done + 1, total);
        }
        info!(jobs = total, "state tomography measurements complete");

        let (raw, expectations) = reconstruct(n, &measured)?;
        let state = DensityMatrix::project(&raw)?;
        Ok(StateEstimate {
            raw,
            state,
            expectations,
            jobs: total,
        })
    }
}

/// Linear inversion from per-setting counts.
///
/// Returns the raw estimate and every ⟨P⟩ it was built from.
pub fn reconstruct(
    num_qubits: usize,
    measured: &[(PauliString, Counts)],
) -> TomographyResult<(Array2<Complex64>, BTreeMap<String, f64>)> {
    let n = num_qubits as u32;
    let mut sums: BTreeMap<String, (PauliString, f64, usize)> = BTreeMap::new();

    for (setting, counts) in measured {
        let factors = setting.ops();
        for mask in 0..(1usize << factors.len()) {
            let sub = PauliString::from_ops(
                factors
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| mask & (1 << *k) != 0)
                    .map(|(_, f)| *f),
            );
            let value = counts
                .expectation(&sub)
                .ok_or_else(|| TomographyError::EmptyCounts(setting.to_label(n)))?;
            let entry = sums
                .entry(sub.to_label(n))
                .or_insert_with(|| (sub, 0.0, 0));
            entry.1 += value;
            entry.2 += 1;
        }
    }

    let d = 1usize << num_qubits;
    let mut rho = Array2::<Complex64>::zeros((d, d));
    let mut expectations = BTreeMap::new();
    for (label, (pauli, sum, samples)) in sums {
        let mean = sum / samples as f64;
        rho.scaled_add(Complex64::new(mean / d as f64, 0.0), &pauli_matrix(&pauli, num_qubits));
        expectations.insert(label, mean);
    }
    Ok((rho, expectations))
}

fn setting_string(setting: &[PauliOp]) -> PauliString {
    PauliString::from_ops(
        setting
            .iter()
            .enumerate()
            .map(|(q, &op)| (QubitId(q as u32), op)),
    )
}

/// Register size of a measurement-free preparation within `max` qubits.
pub(crate) fn check_preparation(
    prep: &Circuit,
    kind: &'static str,
    max: usize,
) -> TomographyResult<usize> {
    if prep.has_measurements() {
        return Err(TomographyError::InvalidCircuit(format!(
            "{} contains measurements; tomography appends its own",
            prep.name()
        )));
    }
    let n = prep.num_qubits();
    if n == 0 {
        return Err(TomographyError::InvalidCircuit(format!(
            "{} has no qubits",
            prep.name()
        )));
    }
    if n > max {
        return Err(TomographyError::TooManyQubits {
            kind,
            num_qubits: n,
            max,
        });
    }
    Ok(n)
}
