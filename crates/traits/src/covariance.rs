//! Factor covariance estimation trait definitions.

use ndarray::Array2;

use crate::EstimatorError;

/// Trait for estimating the covariance matrix of factor returns.
pub trait CovarianceEstimator: Send + Sync {
    /// Estimate the covariance matrix.
    ///
    /// # Arguments
    /// * `factor_returns` - Matrix where each row is a date and each column is a factor
    ///
    /// # Returns
    /// Symmetric covariance matrix (n_factors x n_factors).
    ///
    /// # Errors
    /// Returns `EstimatorError` if there are too few observations.
    fn estimate(&self, factor_returns: &Array2<f64>) -> Result<Array2<f64>, EstimatorError>;

    /// Returns the name of this estimator.
    fn name(&self) -> &str;
}
