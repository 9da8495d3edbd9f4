//! Quadratic forms used by the risk decomposition.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::MathError;

/// Compute `wᵀ M w`.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if `m` is not square or does not
/// match the length of `w`.
pub fn quadratic_form(w: ArrayView1<'_, f64>, m: ArrayView2<'_, f64>) -> Result<f64, MathError> {
    let n = w.len();
    if m.nrows() != m.ncols() {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    if m.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: m.nrows() });
    }
    Ok(w.dot(&m.dot(&w)))
}

/// Compute `wᵀ diag(d) w = Σ w_i² d_i`.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the lengths differ.
pub fn diagonal_quadratic_form(
    w: ArrayView1<'_, f64>,
    d: ArrayView1<'_, f64>,
) -> Result<f64, MathError> {
    if d.len() != w.len() {
        return Err(MathError::DimensionMismatch { expected: w.len(), actual: d.len() });
    }
    Ok(w.iter().zip(d.iter()).map(|(wi, di)| wi * wi * di).sum())
}

/// Compute the sandwich product `B F Bᵀ`.
///
/// # Arguments
/// * `b` - Loadings (n x k)
/// * `f` - Square inner matrix (k x k)
///
/// # Returns
/// The n x n product.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if `f` does not match the columns
/// of `b`.
pub fn sandwich(b: ArrayView2<'_, f64>, f: ArrayView2<'_, f64>) -> Result<Array2<f64>, MathError> {
    let k = b.ncols();
    if f.nrows() != f.ncols() {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    if f.nrows() != k {
        return Err(MathError::DimensionMismatch { expected: k, actual: f.nrows() });
    }
    Ok(b.dot(&f).dot(&b.t()))
}
