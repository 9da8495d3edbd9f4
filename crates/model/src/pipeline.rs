//! End-to-end risk model run.

use hobart_data::{Panel, PanelConfig, build_panel, observations_from_frame};
use hobart_primitives::{Observation, PortfolioWeights, Symbol};
use hobart_traits::ExposureEstimator;
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    CovarianceConfig, DecompositionConfig, ExposureConfig, ModelError, OlsExposureEstimator,
    RiskDecomposer, RiskReport, SampleCovarianceEstimator,
};

/// Configuration for a full model run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskModelConfig {
    /// Input layout and factor list.
    pub panel: PanelConfig,
    /// Exposure regression settings.
    pub exposures: ExposureConfig,
    /// Factor covariance settings.
    pub covariance: CovarianceConfig,
    /// Decomposition tolerances.
    pub decomposition: DecompositionConfig,
}

/// Factor risk model.
///
/// Aligns long-format observations into a panel, regresses each asset on the
/// factor returns, estimates the factor covariance and decomposes the risk of
/// a portfolio. Every run is independent and deterministic.
#[derive(Debug, Clone)]
pub struct RiskModel {
    config: RiskModelConfig,
    exposures: OlsExposureEstimator,
    covariance: SampleCovarianceEstimator,
    decomposer: RiskDecomposer,
}

impl Default for RiskModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskModel {
    /// Create a model with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RiskModelConfig::default())
    }

    /// Create a model with custom configuration.
    #[must_use]
    pub fn with_config(config: RiskModelConfig) -> Self {
        Self {
            exposures: OlsExposureEstimator::with_config(config.exposures),
            covariance: SampleCovarianceEstimator::with_config(config.covariance),
            decomposer: RiskDecomposer::with_config(config.decomposition),
            config,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RiskModelConfig {
        &self.config
    }

    /// Run the model on long-format observations.
    ///
    /// Without `weights` the portfolio is equally weighted across the aligned
    /// assets. Given weights may be in any order but must name exactly the
    /// aligned assets.
    ///
    /// # Errors
    /// Any error from panel construction, estimation or decomposition. No
    /// partial result is returned.
    #[instrument(skip_all, fields(n_observations = observations.len()))]
    pub fn run(
        &self,
        observations: &[Observation],
        weights: Option<&PortfolioWeights>,
    ) -> Result<RiskReport, ModelError> {
        let panel = build_panel(observations, &self.config.panel)?;
        self.run_panel(panel, weights)
    }

    /// Run the model on a long-format frame.
    ///
    /// # Errors
    /// See [`RiskModel::run`]; missing or non-numeric columns are
    /// `ModelError::MalformedInput`.
    pub fn run_frame(
        &self,
        df: &DataFrame,
        weights: Option<&PortfolioWeights>,
    ) -> Result<RiskReport, ModelError> {
        let rows = observations_from_frame(df, &self.config.panel)?;
        let panel = rows.into_panel(&self.config.panel)?;
        self.run_panel(panel, weights)
    }

    /// Run the model on an already aligned panel.
    ///
    /// # Errors
    /// See [`RiskModel::run`].
    pub fn run_panel(
        &self,
        panel: Panel,
        weights: Option<&PortfolioWeights>,
    ) -> Result<RiskReport, ModelError> {
        info!(
            n_dates = panel.n_dates(),
            n_assets = panel.n_assets(),
            n_factors = panel.n_factors(),
            n_dropped = panel.dropped_dates.len(),
            "aligned panel"
        );

        let weights = match weights {
            Some(w) => align_weights(w, &panel.returns.assets)?,
            None => PortfolioWeights::equal_weight(panel.returns.assets.clone()),
        };

        let exposures = self.exposures.estimate(&panel.returns, &panel.factors)?;
        let covariance = self.covariance.estimate_factors(&panel.factors)?;
        let decomposition = self.decomposer.decompose(&exposures, &covariance, &weights)?;

        info!(
            total_variance = decomposition.total_variance,
            volatility = decomposition.volatility,
            factor_share = decomposition.factor_share,
            "decomposed portfolio risk"
        );

        let Panel { returns, dropped_dates, .. } = panel;
        RiskReport::new(returns.dates, dropped_dates, exposures, covariance, decomposition)
    }
}

/// Reorder `weights` to follow `assets`.
///
/// # Errors
/// Returns `ModelError::MalformedInput` unless the weights name every asset
/// exactly once and nothing else.
pub fn align_weights(
    weights: &PortfolioWeights,
    assets: &[Symbol],
) -> Result<PortfolioWeights, ModelError> {
    if weights.assets.len() != weights.weights.len() {
        return Err(ModelError::MalformedInput(format!(
            "{} weights for {} assets",
            weights.weights.len(),
            weights.assets.len()
        )));
    }
    if weights.assets == assets {
        return Ok(weights.clone());
    }
    if weights.len() != assets.len() {
        return Err(ModelError::MalformedInput(format!(
            "weights cover {} assets, the aligned panel has {}",
            weights.len(),
            assets.len()
        )));
    }

    let aligned: Array1<f64> = assets
        .iter()
        .map(|asset| {
            let mut matches = weights.assets.iter().zip(&weights.weights).filter(|(a, _)| *a == asset);
            match (matches.next(), matches.next()) {
                (Some((_, &w)), None) => Ok(w),
                (None, _) => {
                    Err(ModelError::MalformedInput(format!("no weight for asset {asset}")))
                }
                (Some(_), Some(_)) => {
                    Err(ModelError::MalformedInput(format!("duplicate weight for asset {asset}")))
                }
            }
        })
        .collect::<Result<_, _>>()?;

    Ok(PortfolioWeights::new(assets.to_vec(), aligned))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use hobart_primitives::{Date, FactorName};
    use ndarray::array;

    use super::*;
    use crate::ErrorKind;

    fn obs(day: u32, asset: &str, ret: f64, mkt: f64, smb: f64) -> Observation {
        Observation::new(
            Date::from_ymd_opt(2024, 3, day).unwrap(),
            Symbol::new(asset),
            ret,
            vec![(FactorName::new("Mkt"), mkt), (FactorName::new("SMB"), smb)],
        )
    }

    fn observations() -> Vec<Observation> {
        let factors = [
            (0.010, 0.002),
            (-0.005, 0.004),
            (0.012, -0.003),
            (0.003, 0.001),
            (-0.008, -0.002),
            (0.006, 0.003),
        ];
        let noise = [0.001, -0.002, 0.0005, 0.0015, -0.001, 0.0];
        factors
            .iter()
            .zip(noise)
            .enumerate()
            .flat_map(|(t, (&(mkt, smb), e))| {
                let day = t as u32 + 1;
                [
                    obs(day, "AAA", 1.1 * mkt + 0.3 * smb + e, mkt, smb),
                    obs(day, "BBB", 0.7 * mkt - 0.2 * smb - e, mkt, smb),
                    obs(day, "CCC", 0.9 * mkt + 0.5 * e, mkt, smb),
                ]
            })
            .collect()
    }

    #[test]
    fn run_produces_consistent_report() {
        let report = RiskModel::new().run(&observations(), None).unwrap();
        let d = &report.decomposition;

        assert_eq!(report.n_dates, 6);
        assert_eq!(report.exposures.exposures.dim(), (3, 2));
        assert_eq!(report.covariance.matrix.dim(), (2, 2));
        assert_relative_eq!(
            d.factor_variance + d.specific_variance,
            d.total_variance,
            max_relative = 1e-9
        );
        assert_relative_eq!(d.volatility * d.volatility, d.total_variance, max_relative = 1e-12);
        assert_relative_eq!(d.weights.total(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn weights_are_reordered_by_name() {
        let weights = PortfolioWeights::new(
            vec![Symbol::new("CCC"), Symbol::new("AAA"), Symbol::new("BBB")],
            array![0.2, 0.5, 0.3],
        );

        let report = RiskModel::new().run(&observations(), Some(&weights)).unwrap();
        let aligned = &report.decomposition.weights;

        assert_eq!(aligned.assets[0].as_str(), "AAA");
        assert_eq!(aligned.weights.to_vec(), vec![0.5, 0.3, 0.2]);
    }

    #[test]
    fn weights_for_unknown_assets_are_malformed() {
        let weights = PortfolioWeights::new(
            vec![Symbol::new("AAA"), Symbol::new("BBB"), Symbol::new("ZZZ")],
            array![0.2, 0.5, 0.3],
        );

        let err = RiskModel::new().run(&observations(), Some(&weights)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn duplicate_weights_are_malformed() {
        let assets = vec![Symbol::new("AAA"), Symbol::new("BBB")];
        let weights = PortfolioWeights::new(
            vec![Symbol::new("AAA"), Symbol::new("AAA")],
            array![0.5, 0.5],
        );
        assert!(matches!(align_weights(&weights, &assets), Err(ModelError::MalformedInput(_))));
    }

    #[test]
    fn config_round_trips_through_serde_defaults() {
        let config: RiskModelConfig =
            serde_json::from_str(r#"{"covariance": {"dof": "population"}}"#).unwrap();

        assert_eq!(config.covariance.dof, hobart_math::DegreesOfFreedom::Population);
        assert_eq!(config.exposures, ExposureConfig::default());
        assert_eq!(config.panel, PanelConfig::default());
    }

    #[test]
    fn empty_input_is_empty_aligned_panel() {
        let err = RiskModel::new().run(&[], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyAlignedPanel);
    }
}
