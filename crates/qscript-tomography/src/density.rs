//! Density matrices.

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{TomographyError, TomographyResult};
use crate::linalg;

/// A density matrix over `num_qubits` qubits.
///
/// Basis index bit `k` is qubit `k`, matching the simulator's state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix {
    num_qubits: usize,
    data: Array2<Complex64>,
}

impl DensityMatrix {
    /// Wrap a square matrix whose dimension is a power of two.
    ///
    /// No physicality check is made; see [`is_valid`](Self::is_valid).
    pub fn from_matrix(data: Array2<Complex64>) -> TomographyResult<Self> {
        let (rows, cols) = data.dim();
        if rows != cols || !rows.is_power_of_two() {
            return Err(TomographyError::InvalidMatrix(format!(
                "density matrix: shape {rows}x{cols} is not 2^n square"
            )));
        }
        Ok(Self {
            num_qubits: rows.trailing_zeros() as usize,
            data,
        })
    }

    /// |ψ⟩⟨ψ| for a normalised state vector.
    pub fn from_pure_state(amplitudes: &[Complex64]) -> TomographyResult<Self> {
        let d = amplitudes.len();
        Self::from_matrix(Array2::from_shape_fn((d, d), |(i, j)| {
            amplitudes[i] * amplitudes[j].conj()
        }))
    }

    /// I / 2ⁿ
    pub fn maximally_mixed(num_qubits: usize) -> Self {
        let d = 1usize << num_qubits;
        Self {
            num_qubits,
            data: Array2::from_diag_elem(d, Complex64::new(1.0 / d as f64, 0.0)),
        }
    }

    /// Nearest physical state to a raw linear-inversion estimate.
    ///
    /// Hermitises, rescales to unit trace and clips negative eigenvalues.
    pub fn project(raw: &Array2<Complex64>) -> TomographyResult<Self> {
        let hermitian = linalg::hermitian_part(raw);
        let tr = linalg::trace(&hermitian).re;
        if tr.abs() < 1e-12 {
            return Err(TomographyError::InvalidMatrix(
                "estimate: trace vanishes, cannot normalise".into(),
            ));
        }
        let normalised = hermitian.mapv(|z| z / tr);
        Self::from_matrix(linalg::project_to_physical(&normalised)?)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn dimension(&self) -> usize {
        self.data.nrows()
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[[row, col]]
    }

    pub fn trace(&self) -> Complex64 {
        linalg::trace(&self.data)
    }

    /// Tr(ρ²), 1 for pure states and 1/2ⁿ for the maximally mixed one.
    pub fn purity(&self) -> f64 {
        self.data
            .iter()
            .map(Complex64::norm_sqr)
            .sum()
    }

    pub fn is_hermitian(&self, tol: f64) -> bool {
        let d = self.dimension();
        (0..d).all(|i| (i..d).all(|j| (self.data[[i, j]] - self.data[[j, i]].conj()).norm() <= tol))
    }

    /// Ascending eigenvalues; the matrix is treated as Hermitian.
    pub fn eigenvalues(&self) -> TomographyResult<Vec<f64>> {
        linalg::hermitian_eigenvalues(&linalg::hermitian_part(&self.data))
    }

    /// Hermitian, unit trace and positive semidefinite within `tol`.
    pub fn is_valid(&self, tol: f64) -> bool {
        if !self.is_hermitian(tol) || (self.trace() - 1.0).norm() > tol {
            return false;
        }
        self.eigenvalues()
            .map(|values| values.iter().all(|&v| v >= -tol))
            .unwrap_or(false)
    }

    /// ⟨ψ|ρ|ψ⟩, the fidelity with a pure target state.
    pub fn fidelity_with_pure(&self, amplitudes: &[Complex64]) -> TomographyResult<f64> {
        if amplitudes.len() != self.dimension() {
            return Err(TomographyError::InvalidMatrix(format!(
                "target state: {} amplitudes for dimension {}",
                amplitudes.len(),
                self.dimension()
            )));
        }
        let mut total = Complex64::new(0.0, 0.0);
        for ((i, j), rho) in self.data.indexed_iter() {
            total += amplitudes[i].conj() * rho * amplitudes[j];
        }
        Ok(total.re)
    }

    /// Row-major copy of the entries.
    pub fn rows(&self) -> Vec<Vec<Complex64>> {
        self.data.outer_iter().map(|row| row.to_vec()).collect()
    }
}

/// Serialized as `{ "num_qubits": n, "matrix": [[[re, im], ...], ...] }`.
impl Serialize for DensityMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DensityMatrix", 2)?;
        state.serialize_field("num_qubits", &self.num_qubits)?;
        state.serialize_field("matrix", &self.rows())?;
        state.end()
    }
}

impl fmt::Display for DensityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(3);
        for row in self.data.outer_iter() {
            let cells: Vec<String> = row
                .iter()
                .map(|z| {
                    let sign = if z.im < 0.0 { '-' } else { '+' };
                    format!("{:>w$.p$}{sign}{:.p$}i", z.re, z.im.abs(), w = precision + 3, p = precision)
                })
                .collect();
            writeln!(f, "[{}]", cells.join("  "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn bell() -> Vec<Complex64> {
        let a = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let o = Complex64::new(0.0, 0.0);
        vec![a, o, o, a]
    }

    #[test]
    fn test_pure_state_properties() {
        let rho = DensityMatrix::from_pure_state(&bell()).unwrap();
        assert_eq!(rho.num_qubits(), 2);
        assert_eq!(rho.dimension(), 4);
        assert!((rho.trace().re - 1.0).abs() < 1e-12);
        assert!((rho.purity() - 1.0).abs() < 1e-12);
        assert!((rho.fidelity_with_pure(&bell()).unwrap() - 1.0).abs() < 1e-12);
        assert!(rho.is_valid(1e-9));

        let values = rho.eigenvalues().unwrap();
        assert!((values[3] - 1.0).abs() < 1e-10);
        assert!(values[..3].iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn test_maximally_mixed() {
        let rho = DensityMatrix::maximally_mixed(2);
        assert!((rho.purity() - 0.25).abs() < 1e-12);
        assert!((rho.fidelity_with_pure(&bell()).unwrap() - 0.25).abs() < 1e-12);
        assert!(rho.is_valid(1e-9));
    }

    #[test]
    fn test_from_matrix_rejects_bad_shapes() {
        assert!(DensityMatrix::from_matrix(Array2::zeros((3, 3))).is_err());
        assert!(DensityMatrix::from_matrix(Array2::zeros((2, 4))).is_err());
        assert!(DensityMatrix::maximally_mixed(1)
            .fidelity_with_pure(&bell())
            .is_err());
    }

    #[test]
    fn test_project_rescales_trace() {
        let raw = Array2::from_diag_elem(2, Complex64::new(2.0, 0.0));
        let rho = DensityMatrix::project(&raw).unwrap();
        assert!((rho.get(0, 0).re - 0.5).abs() < 1e-12);
        assert!(rho.is_valid(1e-9));

        assert!(DensityMatrix::project(&Array2::zeros((2, 2))).is_err());
    }

    #[test]
    fn test_invalid_when_negative() {
        let raw = ndarray::array![
            [Complex64::new(1.2, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(-0.2, 0.0)]
        ];
        let rho = DensityMatrix::from_matrix(raw).unwrap();
        assert!(rho.is_hermitian(1e-12));
        assert!(!rho.is_valid(1e-9));
    }

    #[test]
    fn test_serialize_and_display() {
        let rho = DensityMatrix::maximally_mixed(1);
        let json = serde_json::to_value(&rho).unwrap();
        assert_eq!(json["num_qubits"], 1);
        assert_eq!(json["matrix"][0][0][0], 0.5);
        assert_eq!(json["matrix"][0][1][1], 0.0);

        let text = rho.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("[ 0.500+0.000i"));
    }
}
