//! Least-squares solvers for factor exposure estimation.

use ndarray::{Array1, Array2, ArrayView1};

use crate::MathError;

/// Maximum number of Jacobi sweeps before giving up.
const MAX_SWEEPS: usize = 64;

/// Thin singular value decomposition `A = U diag(s) Vᵀ`.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors (m x n). Columns paired with a zero singular
    /// value are zero.
    pub u: Array2<f64>,
    /// Singular values (n,), unsorted, in column order of `u` and `v`.
    pub singular_values: Array1<f64>,
    /// Right singular vectors (n x n), orthonormal.
    pub v: Array2<f64>,
}

/// Result of a least-squares fit.
#[derive(Debug, Clone)]
pub struct LstsqResult {
    /// Estimated coefficients (p,).
    pub coefficients: Array1<f64>,
    /// Residuals `y - X b` (n,).
    pub residuals: Array1<f64>,
    /// Numerical rank of the design matrix.
    pub rank: usize,
    /// R-squared.
    pub r_squared: f64,
}

/// One-sided (Hestenes) Jacobi singular value decomposition.
///
/// Rotates pairs of columns of `a` until they are mutually orthogonal; the
/// accumulated rotations form `V` and the column norms are the singular
/// values. Works for any shape, including wide matrices.
///
/// # Errors
/// Returns `MathError::EmptyData` for an empty matrix,
/// `MathError::NumericalInstability` if `a` holds NaN or Inf, and
/// `MathError::LinearAlgebra` if the sweeps fail to converge.
pub fn jacobi_svd(a: &Array2<f64>) -> Result<Svd, MathError> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.iter().any(|x| !x.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite value in matrix".to_string()));
    }

    let mut u = a.to_owned();
    let mut v = Array2::<f64>::eye(n);

    let tolerance = f64::EPSILON * m as f64;
    // Columns whose squared norm falls below this are rounding noise left
    // behind by collinear inputs and are not rotated further.
    let frobenius_sq: f64 = a.iter().map(|x| x * x).sum();
    let negligible = (f64::EPSILON * m as f64).powi(2) * frobenius_sq;

    let mut converged = false;
    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..n.saturating_sub(1) {
            for q in (p + 1)..n {
                let (alpha, beta, gamma) = {
                    let up = u.column(p);
                    let uq = u.column(q);
                    (up.dot(&up), uq.dot(&uq), up.dot(&uq))
                };

                if alpha <= negligible || beta <= negligible {
                    continue;
                }
                if gamma.abs() <= tolerance * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + zeta.hypot(1.0));
                let c = 1.0 / t.hypot(1.0);
                let s = c * t;

                rotate_columns(&mut u, p, q, c, s);
                rotate_columns(&mut v, p, q, c, s);
            }
        }

        if !rotated {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(MathError::LinearAlgebra(format!(
            "jacobi svd did not converge in {MAX_SWEEPS} sweeps"
        )));
    }

    let mut singular_values = Array1::zeros(n);
    for j in 0..n {
        let norm = u.column(j).dot(&u.column(j)).sqrt();
        if norm > 0.0 && norm * norm > negligible {
            singular_values[j] = norm;
            u.column_mut(j).mapv_inplace(|x| x / norm);
        } else {
            u.column_mut(j).fill(0.0);
        }
    }

    Ok(Svd { u, singular_values, v })
}

fn rotate_columns(m: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    for mut row in m.rows_mut() {
        let (xp, xq) = (row[p], row[q]);
        row[p] = c * xp - s * xq;
        row[q] = s * xp + c * xq;
    }
}

/// Least-squares solver that factorizes a design matrix once and solves
/// against many response vectors.
///
/// Singular values at or below `eps * max(n, p) * s_max` are treated as
/// zero, so rank-deficient and under-determined designs yield the
/// minimum-norm solution.
#[derive(Debug, Clone)]
pub struct SvdSolver {
    design: Array2<f64>,
    svd: Svd,
    cutoff: f64,
    rank: usize,
}

impl SvdSolver {
    /// Factorize a design matrix (n x p).
    ///
    /// # Errors
    /// Propagates errors from [`jacobi_svd`].
    pub fn new(design: &Array2<f64>) -> Result<Self, MathError> {
        let (n, p) = design.dim();
        let svd = jacobi_svd(design)?;

        let max_sv = svd.singular_values.iter().copied().fold(0.0, f64::max);
        let cutoff = f64::EPSILON * n.max(p) as f64 * max_sv;
        let rank = svd.singular_values.iter().filter(|&&s| s > cutoff).count();

        Ok(Self { design: design.clone(), svd, cutoff, rank })
    }

    /// Numerical rank of the design matrix.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Number of observations (rows of the design).
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.design.nrows()
    }

    /// Number of coefficients (columns of the design).
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.design.ncols()
    }

    /// Whether the design has fewer independent columns than coefficients.
    #[must_use]
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.n_params()
    }

    /// Singular values of the design.
    #[must_use]
    pub const fn singular_values(&self) -> &Array1<f64> {
        &self.svd.singular_values
    }

    /// Solve for the coefficients minimizing `||X b - y||²`.
    ///
    /// # Errors
    /// Returns an error if `y` has the wrong length or holds NaN or Inf.
    pub fn solve(&self, y: ArrayView1<'_, f64>) -> Result<Array1<f64>, MathError> {
        if y.len() != self.n_obs() {
            return Err(MathError::DimensionMismatch { expected: self.n_obs(), actual: y.len() });
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(MathError::NumericalInstability(
                "non-finite value in response".to_string(),
            ));
        }

        let mut coefficients = Array1::zeros(self.n_params());
        for (j, &sigma) in self.svd.singular_values.iter().enumerate() {
            if sigma > self.cutoff {
                let scale = self.svd.u.column(j).dot(&y) / sigma;
                coefficients.scaled_add(scale, &self.svd.v.column(j));
            }
        }

        Ok(coefficients)
    }

    /// Solve and compute residuals and fit statistics.
    ///
    /// # Errors
    /// See [`SvdSolver::solve`].
    pub fn fit(&self, y: ArrayView1<'_, f64>) -> Result<LstsqResult, MathError> {
        let coefficients = self.solve(y)?;
        let fitted = self.design.dot(&coefficients);
        let residuals = &y - &fitted;

        let y_mean = y.mean().unwrap_or(0.0);
        let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
        let ss_res: f64 = residuals.iter().map(|r| r.powi(2)).sum();
        let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(LstsqResult { coefficients, residuals, rank: self.rank, r_squared })
    }
}

/// Ordinary least squares of `y` on `x` without an intercept.
///
/// Solves: argmin_b ||X b - y||²
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p)
///
/// # Errors
/// Returns error if dimensions mismatch, the input is empty or not finite.
pub fn least_squares(y: ArrayView1<'_, f64>, x: &Array2<f64>) -> Result<LstsqResult, MathError> {
    if x.nrows() != y.len() {
        return Err(MathError::DimensionMismatch { expected: y.len(), actual: x.nrows() });
    }
    SvdSolver::new(x)?.fit(y)
}
