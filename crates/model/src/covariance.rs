//! Factor covariance estimation.

use hobart_math::{DegreesOfFreedom, covariance_matrix};
use hobart_primitives::{FactorMatrix, FactorName};
use hobart_traits::{CovarianceEstimator, EstimatorError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{ModelError, error::estimator_error};

/// Configuration for factor covariance estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovarianceConfig {
    /// Divisor convention for the covariance.
    pub dof: DegreesOfFreedom,
}

impl Default for CovarianceConfig {
    fn default() -> Self {
        Self { dof: DegreesOfFreedom::Sample }
    }
}

/// Covariance matrix F of factor returns, labeled by factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorCovariance {
    /// Factors, in matrix order.
    pub factors: Vec<FactorName>,
    /// Symmetric covariance matrix (n_factors x n_factors).
    pub matrix: Array2<f64>,
    /// Divisor convention used.
    pub dof: DegreesOfFreedom,
    /// Number of dates the estimate is based on.
    pub n_observations: usize,
}

impl FactorCovariance {
    /// Number of factors.
    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.factors.len()
    }

    /// Covariance between two factors.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.factor_index(a)?;
        let j = self.factor_index(b)?;
        Some(self.matrix[[i, j]])
    }

    /// Standard deviation of each factor.
    #[must_use]
    pub fn volatilities(&self) -> Array1<f64> {
        self.matrix.diag().mapv(|v| v.max(0.0).sqrt())
    }

    /// Correlation matrix. Pairs involving a constant factor are zero off
    /// the diagonal.
    #[must_use]
    pub fn correlation(&self) -> Array2<f64> {
        let vol = self.volatilities();
        let k = self.n_factors();
        Array2::from_shape_fn((k, k), |(i, j)| {
            if i == j {
                1.0
            } else if vol[i] > 0.0 && vol[j] > 0.0 {
                self.matrix[[i, j]] / (vol[i] * vol[j])
            } else {
                0.0
            }
        })
    }

    fn factor_index(&self, name: &str) -> Option<usize> {
        self.factors.iter().position(|f| f.as_str() == name)
    }
}

/// Sample covariance of the factor return series.
#[derive(Debug, Clone, Default)]
pub struct SampleCovarianceEstimator {
    config: CovarianceConfig,
}

impl SampleCovarianceEstimator {
    /// Create a new estimator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new estimator with custom configuration.
    #[must_use]
    pub const fn with_config(config: CovarianceConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CovarianceConfig {
        &self.config
    }

    /// Estimate the covariance of a labeled factor matrix.
    ///
    /// # Errors
    /// Returns `ModelError::InsufficientObservations` for fewer than two dates.
    #[instrument(skip_all, fields(n_dates = factors.n_dates(), n_factors = factors.n_factors()))]
    pub fn estimate_factors(&self, factors: &FactorMatrix) -> Result<FactorCovariance, ModelError> {
        let matrix = self.estimate(&factors.values)?;
        debug!(dof = %self.config.dof, "estimated factor covariance");

        Ok(FactorCovariance {
            factors: factors.factors.clone(),
            matrix,
            dof: self.config.dof,
            n_observations: factors.n_dates(),
        })
    }
}

impl CovarianceEstimator for SampleCovarianceEstimator {
    fn estimate(&self, factor_returns: &Array2<f64>) -> Result<Array2<f64>, EstimatorError> {
        covariance_matrix(factor_returns.view(), self.config.dof).map_err(estimator_error)
    }

    fn name(&self) -> &str {
        "sample"
    }
}

/// Estimate the factor covariance with the default configuration.
///
/// # Errors
/// See [`SampleCovarianceEstimator::estimate_factors`].
pub fn estimate_factor_covariance(factors: &FactorMatrix) -> Result<FactorCovariance, ModelError> {
    SampleCovarianceEstimator::new().estimate_factors(factors)
}
