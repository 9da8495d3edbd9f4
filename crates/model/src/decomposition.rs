//! Portfolio risk decomposition.
//!
//! The asset covariance implied by the model is `Σ = B F Bᵀ + Δ`. For
//! weights `w` the portfolio variance splits exactly into a factor part
//! `wᵀ B F Bᵀ w` and a specific part `Σ w_i² δ_i`.

use hobart_math::{diagonal_quadratic_form, quadratic_form, sandwich};
use hobart_primitives::{FactorName, PortfolioWeights};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{ExposureEstimate, FactorCovariance, ModelError};

/// Tolerances for the variance checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Largest relative gap allowed between the total variance and the sum
    /// of its factor and specific parts.
    pub identity_tolerance: f64,
    /// Largest relative negative variance that is clamped to zero.
    pub clamp_tolerance: f64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self { identity_tolerance: 1e-9, clamp_tolerance: 1e-8 }
    }
}

impl DecompositionConfig {
    /// Validate the tolerances.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` for negative or non-finite values.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, value) in
            [("identity_tolerance", self.identity_tolerance), ("clamp_tolerance", self.clamp_tolerance)]
        {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// One factor's share of the portfolio's factor variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    /// Factor name.
    pub factor: FactorName,
    /// Portfolio exposure to the factor, `(Bᵀ w)_k`.
    pub exposure: f64,
    /// Variance contribution `x_k (F x)_k`. Contributions sum to the factor
    /// variance and may be negative.
    pub variance: f64,
    /// Contribution as a percentage of total variance.
    pub percent_of_total: f64,
}

/// A labeled line of the variance breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskComponent {
    /// Component label.
    pub label: &'static str,
    /// Variance attributed to the component.
    pub variance: f64,
    /// Percentage of total variance.
    pub percent: f64,
}

/// Result of decomposing a portfolio's variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDecomposition {
    /// Portfolio weights, aligned to the exposure matrix.
    pub weights: PortfolioWeights,
    /// Total variance `wᵀ Σ w`.
    pub total_variance: f64,
    /// Volatility, the square root of total variance.
    pub volatility: f64,
    /// Factor variance `wᵀ B F Bᵀ w`.
    pub factor_variance: f64,
    /// Specific variance `Σ w_i² δ_i`.
    pub specific_variance: f64,
    /// Factor variance as a percentage of total variance.
    pub factor_share: f64,
    /// Specific variance as a percentage of total variance.
    pub specific_share: f64,
    /// Per-factor breakdown of the factor variance.
    pub factor_contributions: Vec<FactorContribution>,
    /// Model-implied asset covariance Σ (n_assets x n_assets).
    pub asset_covariance: Array2<f64>,
}

impl RiskDecomposition {
    /// Factor and specific lines of the breakdown, in that order.
    #[must_use]
    pub fn components(&self) -> [RiskComponent; 2] {
        [
            RiskComponent {
                label: "Factor",
                variance: self.factor_variance,
                percent: self.factor_share,
            },
            RiskComponent {
                label: "Specific",
                variance: self.specific_variance,
                percent: self.specific_share,
            },
        ]
    }

    /// Portfolio exposures `Bᵀ w`, one entry per factor.
    #[must_use]
    pub fn portfolio_exposures(&self) -> Array1<f64> {
        self.factor_contributions.iter().map(|c| c.exposure).collect()
    }
}

/// Unlabeled variance split.
#[derive(Debug)]
struct VarianceSplit {
    total: f64,
    factor: f64,
    specific: f64,
    portfolio_exposures: Array1<f64>,
    contributions: Array1<f64>,
    asset_covariance: Array2<f64>,
}

/// Decomposes portfolio variance into factor and specific parts.
#[derive(Debug, Clone, Default)]
pub struct RiskDecomposer {
    config: DecompositionConfig,
}

impl RiskDecomposer {
    /// Create a decomposer with default tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decomposer with custom tolerances.
    #[must_use]
    pub const fn with_config(config: DecompositionConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &DecompositionConfig {
        &self.config
    }

    /// Decompose the variance of `weights` under the given model.
    ///
    /// # Errors
    /// - `ModelError::MalformedInput` if the weights do not follow the
    ///   exposure matrix's asset order or are not finite.
    /// - `ModelError::DimensionMismatch` if exposures and covariance
    ///   disagree on the factors.
    /// - `ModelError::NumericInstability` if a variance is negative beyond
    ///   tolerance or the parts do not add up to the total.
    #[instrument(skip_all, fields(n_assets = exposures.n_assets(), n_factors = exposures.n_factors()))]
    pub fn decompose(
        &self,
        exposures: &ExposureEstimate,
        covariance: &FactorCovariance,
        weights: &PortfolioWeights,
    ) -> Result<RiskDecomposition, ModelError> {
        if weights.assets != exposures.assets {
            return Err(ModelError::MalformedInput(
                "portfolio weights do not follow the exposure matrix's asset order".to_string(),
            ));
        }
        if covariance.factors != exposures.factors {
            return Err(ModelError::DimensionMismatch(
                "factor covariance and exposures list different factors".to_string(),
            ));
        }

        let split = self.decompose_raw(
            exposures.exposures.view(),
            covariance.matrix.view(),
            exposures.specific_variances.view(),
            weights.weights.view(),
        )?;

        let share = |part: f64| if split.total > 0.0 { part / split.total * 100.0 } else { 0.0 };
        let factor_contributions = exposures
            .factors
            .iter()
            .zip(split.portfolio_exposures.iter().zip(split.contributions.iter()))
            .map(|(factor, (&exposure, &variance))| FactorContribution {
                factor: factor.clone(),
                exposure,
                variance,
                percent_of_total: share(variance),
            })
            .collect();

        Ok(RiskDecomposition {
            weights: weights.clone(),
            total_variance: split.total,
            volatility: split.total.sqrt(),
            factor_variance: split.factor,
            specific_variance: split.specific,
            factor_share: share(split.factor),
            specific_share: share(split.specific),
            factor_contributions,
            asset_covariance: split.asset_covariance,
        })
    }

    fn decompose_raw(
        &self,
        b: ArrayView2<'_, f64>,
        f: ArrayView2<'_, f64>,
        delta: ArrayView1<'_, f64>,
        w: ArrayView1<'_, f64>,
    ) -> Result<VarianceSplit, ModelError> {
        self.config.validate()?;

        let (n_assets, n_factors) = b.dim();
        if f.dim() != (n_factors, n_factors) {
            return Err(ModelError::DimensionMismatch(format!(
                "factor covariance is {:?}, expected ({n_factors}, {n_factors})",
                f.dim()
            )));
        }
        if delta.len() != n_assets || w.len() != n_assets {
            return Err(ModelError::DimensionMismatch(format!(
                "expected {n_assets} specific variances and weights, got {} and {}",
                delta.len(),
                w.len()
            )));
        }
        if w.iter().any(|x| !x.is_finite()) {
            return Err(ModelError::MalformedInput("portfolio weights must be finite".to_string()));
        }
        if b.iter().chain(f.iter()).chain(delta.iter()).any(|x| !x.is_finite()) {
            return Err(ModelError::NumericInstability("non-finite model estimate".to_string()));
        }
        if delta.iter().any(|&d| d < 0.0) {
            return Err(ModelError::NumericInstability(
                "negative specific variance".to_string(),
            ));
        }

        let common = sandwich(b, f)?;
        let mut asset_covariance = &common + &common.t();
        asset_covariance.mapv_inplace(|x| x * 0.5);
        asset_covariance.diag_mut().zip_mut_with(&delta, |s, d| *s += d);

        let total = quadratic_form(w, asset_covariance.view())?;
        let factor = quadratic_form(w, common.view())?;
        let specific = diagonal_quadratic_form(w, delta)?;

        let scale = total.abs().max(factor.abs() + specific);
        let gap = (factor + specific - total).abs();
        if gap > self.config.identity_tolerance * scale {
            return Err(ModelError::NumericInstability(format!(
                "variance parts do not add up: total {total:e}, factor {factor:e}, specific {specific:e}"
            )));
        }

        let factor = self.clamp("factor", factor, scale)?;
        let total = self.clamp("total", total, scale)?;

        let portfolio_exposures = b.t().dot(&w);
        let contributions = &portfolio_exposures * &f.dot(&portfolio_exposures);

        debug!(total, factor, specific, "decomposed variance");

        Ok(VarianceSplit {
            total,
            factor,
            specific,
            portfolio_exposures,
            contributions,
            asset_covariance,
        })
    }

    /// Clamp a tiny negative variance from rounding to zero.
    fn clamp(&self, what: &str, value: f64, scale: f64) -> Result<f64, ModelError> {
        if value >= 0.0 {
            return Ok(value);
        }
        if -value <= self.config.clamp_tolerance * scale {
            warn!(what, value, "clamping negative variance to zero");
            return Ok(0.0);
        }
        Err(ModelError::NumericInstability(format!("negative {what} variance {value:e}")))
    }
}

/// Decompose portfolio risk with the default tolerances.
///
/// # Errors
/// See [`RiskDecomposer::decompose`].
pub fn decompose_portfolio_risk(
    exposures: &ExposureEstimate,
    covariance: &FactorCovariance,
    weights: &PortfolioWeights,
) -> Result<RiskDecomposition, ModelError> {
    RiskDecomposer::new().decompose(exposures, covariance, weights)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use hobart_math::DegreesOfFreedom;
    use hobart_primitives::Symbol;
    use ndarray::array;

    use super::*;

    fn assets(n: usize) -> Vec<Symbol> {
        (0..n).map(|i| Symbol::new(format!("A{i}"))).collect()
    }

    fn factors(k: usize) -> Vec<FactorName> {
        (0..k).map(|i| FactorName::new(format!("F{i}"))).collect()
    }

    fn model(b: Array2<f64>, f: Array2<f64>, delta: Array1<f64>) -> (ExposureEstimate, FactorCovariance) {
        let (n, k) = b.dim();
        let exposures = ExposureEstimate {
            assets: assets(n),
            factors: factors(k),
            exposures: b,
            specific_variances: delta,
            r_squared: Array1::zeros(n),
            rank: k,
            rank_deficient: false,
            residual_dof: DegreesOfFreedom::Population,
        };
        let covariance = FactorCovariance {
            factors: factors(k),
            matrix: f,
            dof: DegreesOfFreedom::Sample,
            n_observations: 10,
        };
        (exposures, covariance)
    }

    #[test]
    fn variance_by_hand() {
        let (exposures, covariance) = model(
            array![[1.0, 0.5], [0.8, -0.2]],
            array![[0.04, 0.01], [0.01, 0.02]],
            array![0.01, 0.03],
        );
        let weights = PortfolioWeights::new(assets(2), array![0.5, 0.5]);

        let result = decompose_portfolio_risk(&exposures, &covariance, &weights).unwrap();

        // x = Bᵀ w = [0.9, 0.15]; xᵀ F x = 0.0324 + 0.0027 + 0.00045
        assert_relative_eq!(result.factor_variance, 0.03555, epsilon = 1e-15);
        // 0.25 * 0.01 + 0.25 * 0.03
        assert_relative_eq!(result.specific_variance, 0.01, epsilon = 1e-15);
        assert_relative_eq!(result.total_variance, 0.04555, epsilon = 1e-14);
        assert_relative_eq!(result.volatility, 0.04555_f64.sqrt(), epsilon = 1e-14);
        assert_relative_eq!(result.factor_share + result.specific_share, 100.0, epsilon = 1e-9);

        let x = result.portfolio_exposures();
        assert_relative_eq!(x[0], 0.9, epsilon = 1e-15);
        assert_relative_eq!(x[1], 0.15, epsilon = 1e-15);
        let contribution_sum: f64 = result.factor_contributions.iter().map(|c| c.variance).sum();
        assert_relative_eq!(contribution_sum, result.factor_variance, epsilon = 1e-15);
    }

    #[test]
    fn asset_covariance_is_symmetric_with_specific_diagonal() {
        let (exposures, covariance) = model(
            array![[1.0, 0.5], [0.8, -0.2], [1.2, 0.1]],
            array![[0.04, 0.01], [0.01, 0.02]],
            array![0.01, 0.03, 0.02],
        );
        let weights = PortfolioWeights::equal_weight(assets(3));

        let result = decompose_portfolio_risk(&exposures, &covariance, &weights).unwrap();
        let sigma = &result.asset_covariance;

        assert_eq!(sigma.dim(), (3, 3));
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(sigma[[i, j]], sigma[[j, i]]);
            }
        }
        // [1, 0.5] F [1, 0.5]ᵀ + δ_0
        assert_relative_eq!(sigma[[0, 0]], 0.055 + 0.01, epsilon = 1e-15);
    }

    #[test]
    fn zero_variance_gives_zero_shares() {
        let (exposures, covariance) =
            model(array![[0.0], [0.0]], array![[0.04]], array![0.0, 0.0]);
        let weights = PortfolioWeights::equal_weight(assets(2));

        let result = decompose_portfolio_risk(&exposures, &covariance, &weights).unwrap();

        assert_eq!(result.total_variance, 0.0);
        assert_eq!(result.volatility, 0.0);
        assert_eq!(result.factor_share, 0.0);
        assert_eq!(result.specific_share, 0.0);
    }

    #[test]
    fn indefinite_factor_covariance_is_unstable() {
        let (exposures, covariance) =
            model(array![[1.0], [1.0]], array![[-0.04]], array![0.0, 0.0]);
        let weights = PortfolioWeights::equal_weight(assets(2));

        assert!(matches!(
            decompose_portfolio_risk(&exposures, &covariance, &weights),
            Err(ModelError::NumericInstability(_))
        ));
    }

    #[test]
    fn tiny_negative_variance_is_clamped() {
        let (exposures, covariance) =
            model(array![[1.0], [1.0]], array![[-1e-12]], array![0.01, 0.01]);
        let weights = PortfolioWeights::equal_weight(assets(2));

        let result = decompose_portfolio_risk(&exposures, &covariance, &weights).unwrap();
        assert_eq!(result.factor_variance, 0.0);
        assert_relative_eq!(result.total_variance, 0.005, epsilon = 1e-9);
    }

    #[test]
    fn negative_specific_variance_is_unstable() {
        let (exposures, covariance) = model(array![[1.0]], array![[0.01]], array![-0.01]);
        let weights = PortfolioWeights::equal_weight(assets(1));

        assert!(matches!(
            decompose_portfolio_risk(&exposures, &covariance, &weights),
            Err(ModelError::NumericInstability(_))
        ));
    }

    #[test]
    fn misaligned_weights_are_malformed() {
        let (exposures, covariance) =
            model(array![[1.0], [0.5]], array![[0.01]], array![0.01, 0.02]);
        let weights = PortfolioWeights::new(
            vec![Symbol::new("A1"), Symbol::new("A0")],
            array![0.5, 0.5],
        );

        let err = decompose_portfolio_risk(&exposures, &covariance, &weights).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedInput);
    }

    #[test]
    fn non_finite_weights_are_malformed() {
        let (exposures, covariance) =
            model(array![[1.0], [0.5]], array![[0.01]], array![0.01, 0.02]);
        let weights = PortfolioWeights::new(assets(2), array![f64::NAN, 0.5]);

        assert!(matches!(
            decompose_portfolio_risk(&exposures, &covariance, &weights),
            Err(ModelError::MalformedInput(_))
        ));
    }

    #[test]
    fn mismatched_factors() {
        let (exposures, mut covariance) =
            model(array![[1.0], [0.5]], array![[0.01]], array![0.01, 0.02]);
        covariance.factors = vec![FactorName::new("Other")];
        let weights = PortfolioWeights::equal_weight(assets(2));

        assert!(matches!(
            decompose_portfolio_risk(&exposures, &covariance, &weights),
            Err(ModelError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn invalid_tolerance() {
        let config = DecompositionConfig { identity_tolerance: -1.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn components_are_labeled() {
        let (exposures, covariance) =
            model(array![[1.0], [0.5]], array![[0.01]], array![0.01, 0.02]);
        let weights = PortfolioWeights::equal_weight(assets(2));

        let result = decompose_portfolio_risk(&exposures, &covariance, &weights).unwrap();
        let [factor, specific] = result.components();

        assert_eq!(factor.label, "Factor");
        assert_eq!(specific.label, "Specific");
        assert_relative_eq!(factor.variance + specific.variance, result.total_variance, epsilon = 1e-15);
    }
}
