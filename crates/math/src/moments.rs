//! Sample moments with an explicit degrees-of-freedom convention.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::MathError;

/// Denominator convention for variances and covariances.
///
/// `Population` divides by `n`, `Sample` divides by `n - 1`. Switching
/// between them rescales every variance by `n / (n - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreesOfFreedom {
    /// Divide by `n`.
    Population,
    /// Divide by `n - 1`.
    Sample,
}

impl DegreesOfFreedom {
    /// Delta degrees of freedom subtracted from `n`.
    #[must_use]
    pub const fn ddof(self) -> usize {
        match self {
            Self::Population => 0,
            Self::Sample => 1,
        }
    }

    /// Minimum number of observations for which the estimate is defined.
    #[must_use]
    pub const fn min_observations(self) -> usize {
        self.ddof() + 1
    }

    /// Denominator for `n` observations.
    #[must_use]
    pub const fn denominator(self, n: usize) -> usize {
        n.saturating_sub(self.ddof())
    }
}

impl std::fmt::Display for DegreesOfFreedom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Population => write!(f, "population (n)"),
            Self::Sample => write!(f, "sample (n - 1)"),
        }
    }
}

/// Arithmetic mean.
///
/// # Errors
/// Returns `MathError::EmptyData` for an empty input.
pub fn mean(data: ArrayView1<'_, f64>) -> Result<f64, MathError> {
    data.mean().ok_or(MathError::EmptyData)
}

/// Variance of a series.
///
/// # Errors
/// Returns `MathError::InsufficientObservations` when the series is shorter
/// than the convention allows.
pub fn variance(data: ArrayView1<'_, f64>, dof: DegreesOfFreedom) -> Result<f64, MathError> {
    let n = data.len();
    if n < dof.min_observations() {
        return Err(MathError::InsufficientObservations {
            required: dof.min_observations(),
            actual: n,
        });
    }

    let mu = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - mu).powi(2)).sum();
    Ok(ss / dof.denominator(n) as f64)
}

/// Covariance matrix of the columns of `data` (n_obs x n_vars).
///
/// The result is exactly symmetric: the upper triangle is computed and
/// mirrored. At least two observations are required under either
/// convention; a single row has no dispersion to estimate.
///
/// # Errors
/// Returns `MathError::InsufficientObservations` for fewer than two rows,
/// `MathError::EmptyData` for zero columns and
/// `MathError::NumericalInstability` for non-finite input.
pub fn covariance_matrix(
    data: ArrayView2<'_, f64>,
    dof: DegreesOfFreedom,
) -> Result<Array2<f64>, MathError> {
    let (n, k) = data.dim();
    let required = dof.min_observations().max(2);
    if n < required {
        return Err(MathError::InsufficientObservations { required, actual: n });
    }
    if k == 0 {
        return Err(MathError::EmptyData);
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite value in data".to_string()));
    }

    let means = data.mean_axis(Axis(0)).ok_or(MathError::EmptyData)?;
    let centered = &data - &means;
    let denom = dof.denominator(n) as f64;

    let mut cov = Array2::zeros((k, k));
    for i in 0..k {
        for j in i..k {
            let c = centered.column(i).dot(&centered.column(j)) / denom;
            cov[[i, j]] = c;
            cov[[j, i]] = c;
        }
    }

    Ok(cov)
}
