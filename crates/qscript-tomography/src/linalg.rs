//! Hermitian eigenproblems on top of `faer`.
//!
//! Matrices live as `ndarray` arrays everywhere else in the crate; they are
//! copied into a `faer::Mat` only for the decomposition.

use faer::{Mat, Side, c64};
use ndarray::Array2;
use num_complex::Complex64;
use tracing::trace;

use crate::error::{TomographyError, TomographyResult};

fn to_faer(a: &Array2<Complex64>) -> Mat<c64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| {
        let z = a[[i, j]];
        c64::new(z.re, z.im)
    })
}

/// Ascending eigenvalues of a Hermitian matrix.
///
/// Only the lower triangle is read.
pub(crate) fn hermitian_eigenvalues(a: &Array2<Complex64>) -> TomographyResult<Vec<f64>> {
    to_faer(a)
        .self_adjoint_eigenvalues(Side::Lower)
        .map_err(|e| TomographyError::Eigendecomposition(format!("{e:?}")))
}

/// (A + A†) / 2
pub(crate) fn hermitian_part(a: &Array2<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn(a.dim(), |(i, j)| 0.5 * (a[[i, j]] + a[[j, i]].conj()))
}

pub(crate) fn trace(a: &Array2<Complex64>) -> Complex64 {
    a.diag().iter().sum()
}

/// Closest density matrix to a unit-trace Hermitian estimate.
///
/// Eigenvalues are clipped the Smolin–Gambetta–Smith way: starting from
/// the most negative, each one is zeroed while the running deficit spread
/// over the remaining eigenvalues would still leave it negative; the
/// accumulated deficit is then subtracted evenly from the survivors.
pub(crate) fn project_to_physical(a: &Array2<Complex64>) -> TomographyResult<Array2<Complex64>> {
    let d = a.nrows();
    let evd = to_faer(a)
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| TomographyError::Eigendecomposition(format!("{e:?}")))?;
    let s = evd.S().column_vector();
    let u = evd.U();

    // faer returns the spectrum ascending; clipping wants it descending.
    let mut values: Vec<f64> = (0..d).rev().map(|k| s[k].re).collect();
    clip_eigenvalues(&mut values);
    values.reverse();
    trace!(dim = d, ?values, "clipped spectrum");

    let mut out = Array2::<Complex64>::zeros((d, d));
    for (k, &lambda) in values.iter().enumerate() {
        if lambda == 0.0 {
            continue;
        }
        let col: Vec<Complex64> = (0..d)
            .map(|i| {
                let z = u[(i, k)];
                Complex64::new(z.re, z.im)
            })
            .collect();
        for i in 0..d {
            let ui = lambda * col[i];
            for j in 0..d {
                out[[i, j]] += ui * col[j].conj();
            }
        }
    }
    Ok(out)
}

/// In-place clipping of descending eigenvalues that sum to one.
pub(crate) fn clip_eigenvalues(values: &mut [f64]) {
    let mut deficit = 0.0;
    let mut kept = values.len();
    while kept > 0 && values[kept - 1] + deficit / (kept as f64) < 0.0 {
        deficit += values[kept - 1];
        values[kept - 1] = 0.0;
        kept -= 1;
    }
    if kept > 0 {
        let shift = deficit / kept as f64;
        for v in &mut values[..kept] {
            *v += shift;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_hermitian_eigenvalues_of_pauli_y() {
        let y = ndarray::array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]];
        let values = hermitian_eigenvalues(&y).unwrap();
        assert_eq!(values.len(), 2);
        assert!((values[0] + 1.0).abs() < 1e-12);
        assert!((values[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clip_eigenvalues() {
        let mut values = [0.6, 0.5, -0.1];
        clip_eigenvalues(&mut values);
        assert!((values[0] - 0.55).abs() < 1e-12);
        assert!((values[1] - 0.45).abs() < 1e-12);
        assert_eq!(values[2], 0.0);

        let mut physical = [0.7, 0.3];
        clip_eigenvalues(&mut physical);
        assert_eq!(physical, [0.7, 0.3]);
    }

    #[test]
    fn test_clip_cascades() {
        // Removing -0.2 pushes 0.05 below zero as well.
        let mut values = [1.15, 0.05, -0.2];
        clip_eigenvalues(&mut values);
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert_eq!(values[1], 0.0);
        assert_eq!(values[2], 0.0);
    }

    #[test]
    fn test_projection_leaves_physical_state() {
        let rho = ndarray::array![[c(0.75, 0.0), c(0.1, 0.1)], [c(0.1, -0.1), c(0.25, 0.0)]];
        let projected = project_to_physical(&rho).unwrap();
        for (x, y) in rho.iter().zip(projected.iter()) {
            assert!((x - y).norm() < 1e-10);
        }
    }

    #[test]
    fn test_projection_removes_negative_eigenvalue() {
        // diag(1.1, -0.1) is the best physical state |0><0| after clipping.
        let rho = ndarray::array![[c(1.1, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-0.1, 0.0)]];
        let projected = project_to_physical(&rho).unwrap();
        assert!((projected[[0, 0]].re - 1.0).abs() < 1e-10);
        assert!(projected[[1, 1]].norm() < 1e-10);
        assert!((trace(&projected).re - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_hermitian_eigenvalues_complex_offdiagonal() {
        // [[2, 1-i], [1+i, 3]] has eigenvalues 1 and 4.
        let a = ndarray::array![[c(2.0, 0.0), c(1.0, -1.0)], [c(1.0, 1.0), c(3.0, 0.0)]];
        let values = hermitian_eigenvalues(&a).unwrap();
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert!((values[1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_projection_keeps_eigenvectors() {
        // |+i><+i| scaled to 1.2 plus -0.2 on |-i><-i|: clipping leaves |+i><+i|.
        let rho = ndarray::array![[c(0.5, 0.0), c(0.0, -0.7)], [c(0.0, 0.7), c(0.5, 0.0)]];
        let projected = project_to_physical(&rho).unwrap();
        assert!((projected[[0, 0]].re - 0.5).abs() < 1e-10);
        assert!((projected[[1, 1]].re - 0.5).abs() < 1e-10);
        assert!((projected[[0, 1]] - c(0.0, -0.5)).norm() < 1e-10);
        assert!((projected[[1, 0]] - c(0.0, 0.5)).norm() < 1e-10);
    }
}
