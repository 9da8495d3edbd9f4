//! Time-series estimation of asset factor exposures.

use hobart_math::{DegreesOfFreedom, MathError, SvdSolver, variance};
use hobart_primitives::{FactorMatrix, FactorName, ReturnMatrix, Symbol};
use hobart_traits::{EstimatorError, ExposureEstimator};
use ndarray::{Array1, Array2, ArrayView1, Axis};
#[cfg(feature = "parallel")]
use ndarray::parallel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{ModelError, error::estimator_error};

/// Configuration for exposure estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Divisor convention for the residual (idiosyncratic) variance.
    pub residual_dof: DegreesOfFreedom,
    /// Accept fewer dates than factors and return the minimum-norm fit.
    pub allow_underdetermined: bool,
    /// Fail instead of warning when the factor design is rank deficient.
    pub require_full_rank: bool,
    /// Run the per-asset regressions on the rayon pool.
    pub parallel: bool,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            residual_dof: DegreesOfFreedom::Population,
            allow_underdetermined: false,
            require_full_rank: false,
            parallel: false,
        }
    }
}

/// Estimated exposures and idiosyncratic variances for every asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureEstimate {
    /// Assets, in return-matrix column order.
    pub assets: Vec<Symbol>,
    /// Factors, in factor-matrix column order.
    pub factors: Vec<FactorName>,
    /// Exposure matrix B (n_assets x n_factors).
    pub exposures: Array2<f64>,
    /// Residual variance per asset (the diagonal of Δ).
    pub specific_variances: Array1<f64>,
    /// Coefficient of determination per asset.
    pub r_squared: Array1<f64>,
    /// Numerical rank of the factor design.
    pub rank: usize,
    /// Whether the factor design was rank deficient.
    pub rank_deficient: bool,
    /// Convention used for `specific_variances`.
    pub residual_dof: DegreesOfFreedom,
}

impl ExposureEstimate {
    /// Number of assets.
    #[must_use]
    pub const fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// Number of factors.
    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.factors.len()
    }

    /// Exposures of one asset, one entry per factor.
    #[must_use]
    pub fn exposures_of(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
        self.asset_index(asset).map(|i| self.exposures.row(i))
    }

    /// Exposure of one asset to one factor.
    #[must_use]
    pub fn exposure(&self, asset: &str, factor: &str) -> Option<f64> {
        let i = self.asset_index(asset)?;
        let k = self.factors.iter().position(|f| f.as_str() == factor)?;
        Some(self.exposures[[i, k]])
    }

    /// Idiosyncratic variance of one asset.
    #[must_use]
    pub fn specific_variance(&self, asset: &str) -> Option<f64> {
        self.asset_index(asset).map(|i| self.specific_variances[i])
    }

    fn asset_index(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.as_str() == asset)
    }
}

struct AssetFit {
    coefficients: Array1<f64>,
    specific_variance: f64,
    r_squared: f64,
}

/// Ordinary least squares exposure estimator.
///
/// Each asset's return series is regressed on the factor return series
/// without an intercept. The design is factorized once and shared by all
/// assets.
#[derive(Debug, Clone, Default)]
pub struct OlsExposureEstimator {
    config: ExposureConfig,
}

impl OlsExposureEstimator {
    /// Create a new estimator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ExposureConfig {
        &self.config
    }

    /// Estimate exposures for every asset in `returns`.
    ///
    /// # Errors
    /// - `ModelError::DimensionMismatch` if the two matrices have different dates.
    /// - `ModelError::InsufficientObservations` if there are fewer dates than
    ///   factors and under-determined fits are not allowed, or if the design is
    ///   rank deficient and full rank is required.
    #[instrument(
        skip_all,
        fields(n_dates = returns.n_dates(), n_assets = returns.n_assets(), n_factors = factors.n_factors())
    )]
    pub fn estimate(
        &self,
        returns: &ReturnMatrix,
        factors: &FactorMatrix,
    ) -> Result<ExposureEstimate, ModelError> {
        if returns.dates != factors.dates {
            return Err(ModelError::DimensionMismatch(
                "return and factor matrices do not share a date index".to_string(),
            ));
        }
        if returns.n_assets() == 0 {
            return Err(ModelError::MalformedInput("return matrix has no assets".to_string()));
        }

        let solver = self.solver(&factors.values)?;
        let fits = self.fit_assets(&solver, returns)?;

        let mut exposures = Array2::zeros((returns.n_assets(), factors.n_factors()));
        let mut specific_variances = Array1::zeros(returns.n_assets());
        let mut r_squared = Array1::zeros(returns.n_assets());
        for (i, fit) in fits.into_iter().enumerate() {
            exposures.row_mut(i).assign(&fit.coefficients);
            specific_variances[i] = fit.specific_variance;
            r_squared[i] = fit.r_squared;
        }

        debug!(rank = solver.rank(), "estimated exposures");

        Ok(ExposureEstimate {
            assets: returns.assets.clone(),
            factors: factors.factors.clone(),
            exposures,
            specific_variances,
            r_squared,
            rank: solver.rank(),
            rank_deficient: solver.is_rank_deficient(),
            residual_dof: self.config.residual_dof,
        })
    }

    /// Check the design shape and factorize it.
    fn solver(&self, design: &Array2<f64>) -> Result<SvdSolver, EstimatorError> {
        let (n_dates, n_factors) = design.dim();
        if n_factors == 0 {
            return Err(EstimatorError::InvalidConfig("at least one factor is required".to_string()));
        }
        if n_dates < n_factors {
            if !self.config.allow_underdetermined {
                return Err(EstimatorError::InsufficientData {
                    required: n_factors,
                    actual: n_dates,
                });
            }
            warn!(n_dates, n_factors, "fewer dates than factors; exposures are not identified");
        }

        let solver = SvdSolver::new(design).map_err(estimator_error)?;
        if solver.is_rank_deficient() {
            if self.config.require_full_rank {
                return Err(EstimatorError::RankDeficient {
                    rank: solver.rank(),
                    columns: n_factors,
                });
            }
            warn!(
                rank = solver.rank(),
                n_factors,
                "factor returns are collinear; exposures are the minimum-norm solution"
            );
        }

        Ok(solver)
    }

    fn fit_assets(
        &self,
        solver: &SvdSolver,
        returns: &ReturnMatrix,
    ) -> Result<Vec<AssetFit>, MathError> {
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            return returns
                .values
                .axis_iter(Axis(1))
                .into_par_iter()
                .map(|y| self.fit_asset(solver, y))
                .collect();
        }

        returns.values.axis_iter(Axis(1)).map(|y| self.fit_asset(solver, y)).collect()
    }

    fn fit_asset(&self, solver: &SvdSolver, y: ArrayView1<'_, f64>) -> Result<AssetFit, MathError> {
        let fit = solver.fit(y)?;
        let specific_variance = variance(fit.residuals.view(), self.config.residual_dof)?;
        Ok(AssetFit { coefficients: fit.coefficients, specific_variance, r_squared: fit.r_squared })
    }
}

impl ExposureEstimator for OlsExposureEstimator {
    type Config = ExposureConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn estimate_single(
        &self,
        returns: ArrayView1<'_, f64>,
        factor_returns: &Array2<f64>,
    ) -> Result<(Array1<f64>, Array1<f64>), EstimatorError> {
        if returns.len() != factor_returns.nrows() {
            return Err(EstimatorError::DimensionMismatch {
                expected: factor_returns.nrows(),
                actual: returns.len(),
                context: "returns".to_string(),
            });
        }

        let fit = self.solver(factor_returns)?.fit(returns).map_err(estimator_error)?;
        Ok((fit.coefficients, fit.residuals))
    }
}

/// Estimate exposures with the default configuration.
///
/// # Errors
/// See [`OlsExposureEstimator::estimate`].
pub fn estimate_exposures(
    returns: &ReturnMatrix,
    factors: &FactorMatrix,
) -> Result<ExposureEstimate, ModelError> {
    OlsExposureEstimator::new().estimate(returns, factors)
}
