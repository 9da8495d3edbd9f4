//! Exposure estimation trait definitions.

use ndarray::{Array1, Array2, ArrayView1};

/// Errors that can occur during estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient data for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Rank deficiency in design matrix.
    #[error("rank deficient design matrix: rank {rank} < columns {columns}")]
    RankDeficient {
        /// Actual rank.
        rank: usize,
        /// Number of columns.
        columns: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// NaN, Inf or negative variance in the computation.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl EstimatorError {
    /// Returns whether more or better-conditioned data could fix this error.
    #[must_use]
    pub const fn is_data_limited(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::RankDeficient { .. })
    }
}

/// Trait for estimating one asset's factor exposures by time-series
/// regression on factor returns.
pub trait ExposureEstimator: Send + Sync {
    /// Configuration type for this estimator.
    type Config: Default + Clone + Send + Sync;

    /// Create a new estimator with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Estimate the exposures of a single asset.
    ///
    /// # Arguments
    /// * `returns` - Asset returns (n_dates,)
    /// * `factor_returns` - Factor return design matrix (n_dates x n_factors)
    ///
    /// # Returns
    /// Tuple of (exposures, residuals)
    ///
    /// # Errors
    /// Returns `EstimatorError` if dimensions mismatch or computation fails.
    fn estimate_single(
        &self,
        returns: ArrayView1<'_, f64>,
        factor_returns: &Array2<f64>,
    ) -> Result<(Array1<f64>, Array1<f64>), EstimatorError>;
}
