//! Date-aligned panel construction.

use std::collections::{BTreeMap, BTreeSet};

use hobart_primitives::{Date, FactorMatrix, Observation, ReturnMatrix, Symbol};
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{DataError, PanelConfig};

/// Aligned return and factor matrices sharing one date index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    /// Asset returns (n_dates x n_assets).
    pub returns: ReturnMatrix,
    /// Mean factor returns per date (n_dates x n_factors).
    pub factors: FactorMatrix,
    /// Dates present in the input but missing at least one asset.
    pub dropped_dates: Vec<Date>,
}

impl Panel {
    /// Number of aligned dates.
    #[must_use]
    pub const fn n_dates(&self) -> usize {
        self.returns.n_dates()
    }

    /// Number of assets.
    #[must_use]
    pub const fn n_assets(&self) -> usize {
        self.returns.n_assets()
    }

    /// Number of factors.
    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.factors.n_factors()
    }

    /// Split into the return and factor matrices.
    #[must_use]
    pub fn into_parts(self) -> (ReturnMatrix, FactorMatrix) {
        (self.returns, self.factors)
    }
}

/// Observations that share a date.
struct DateBucket<'a> {
    returns: BTreeMap<&'a Symbol, f64>,
    missing: BTreeSet<&'a Symbol>,
    factor_sums: Vec<f64>,
    rows: usize,
}

impl DateBucket<'_> {
    fn new(n_factors: usize) -> Self {
        Self {
            returns: BTreeMap::new(),
            missing: BTreeSet::new(),
            factor_sums: vec![0.0; n_factors],
            rows: 0,
        }
    }
}

/// Build the aligned panel from long-format observations.
///
/// A date is kept only if every asset appearing anywhere in `observations`
/// has a return on it. Factor values on a kept date are the arithmetic mean
/// over all rows of that date. Rows are sorted by date and asset columns
/// are sorted by identifier.
///
/// # Errors
/// - `DataError::InvalidParameter` if the factor list is invalid.
/// - `DataError::DuplicateObservation` if a (date, asset) pair repeats.
/// - `DataError::MissingFactor` / `DataError::NonFinite` for bad rows.
/// - `DataError::EmptyAlignedPanel` if no date survives alignment.
pub fn build_panel(observations: &[Observation], config: &PanelConfig) -> Result<Panel, DataError> {
    build_panel_with_missing(observations, &[], config)
}

/// Build the aligned panel when some rows are known to lack a return.
///
/// Each `(date, asset)` in `missing` is a row that exists without a return.
/// The asset still belongs to the universe and the date still counts as
/// seen, so both take part in alignment: an asset whose returns are all
/// missing leaves no complete date. Missing rows also take part in the
/// duplicate check.
///
/// # Errors
/// See [`build_panel`].
#[instrument(
    skip_all,
    fields(
        n_observations = observations.len(),
        n_missing = missing.len(),
        n_factors = config.n_factors()
    )
)]
pub fn build_panel_with_missing(
    observations: &[Observation],
    missing: &[(Date, Symbol)],
    config: &PanelConfig,
) -> Result<Panel, DataError> {
    config.validate()?;

    let n_factors = config.n_factors();
    let mut universe: BTreeSet<&Symbol> = BTreeSet::new();
    let mut buckets: BTreeMap<Date, DateBucket<'_>> = BTreeMap::new();

    for obs in observations {
        if !obs.asset_return.is_finite() {
            return Err(DataError::NonFinite {
                date: obs.date,
                asset: obs.asset.clone(),
                field: "return".to_string(),
            });
        }

        let bucket = buckets.entry(obs.date).or_insert_with(|| DateBucket::new(n_factors));
        if bucket.returns.insert(&obs.asset, obs.asset_return).is_some() {
            return Err(DataError::DuplicateObservation {
                date: obs.date,
                asset: obs.asset.clone(),
            });
        }

        for (sum, name) in bucket.factor_sums.iter_mut().zip(&config.factor_names) {
            let value = obs.factor(name.as_str()).ok_or_else(|| DataError::MissingFactor {
                date: obs.date,
                asset: obs.asset.clone(),
                factor: name.to_string(),
            })?;
            if !value.is_finite() {
                return Err(DataError::NonFinite {
                    date: obs.date,
                    asset: obs.asset.clone(),
                    field: name.column(&config.factor_prefix),
                });
            }
            *sum += value;
        }
        bucket.rows += 1;
        universe.insert(&obs.asset);
    }

    for (date, asset) in missing {
        let bucket = buckets.entry(*date).or_insert_with(|| DateBucket::new(n_factors));
        if bucket.returns.contains_key(asset) || !bucket.missing.insert(asset) {
            return Err(DataError::DuplicateObservation { date: *date, asset: asset.clone() });
        }
        universe.insert(asset);
    }

    let n_assets = universe.len();
    let mut kept: Vec<(Date, &DateBucket<'_>)> = Vec::with_capacity(buckets.len());
    let mut dropped_dates = Vec::new();
    for (date, bucket) in &buckets {
        if bucket.returns.len() == n_assets {
            kept.push((*date, bucket));
        } else {
            debug!(%date, present = bucket.returns.len(), expected = n_assets, "dropping date");
            dropped_dates.push(*date);
        }
    }

    if kept.is_empty() {
        return Err(DataError::EmptyAlignedPanel);
    }

    let n_dates = kept.len();
    let mut returns = Array2::zeros((n_dates, n_assets));
    let mut factors = Array2::zeros((n_dates, n_factors));
    for (i, (_, bucket)) in kept.iter().enumerate() {
        // Keys of a complete bucket are exactly the universe, in the same order.
        for (j, r) in bucket.returns.values().enumerate() {
            returns[[i, j]] = *r;
        }
        for (k, sum) in bucket.factor_sums.iter().enumerate() {
            factors[[i, k]] = sum / bucket.rows as f64;
        }
    }

    let dates: Vec<Date> = kept.iter().map(|(d, _)| *d).collect();
    let assets: Vec<Symbol> = universe.into_iter().cloned().collect();

    debug!(n_dates, n_assets, n_dropped = dropped_dates.len(), "aligned panel");

    Ok(Panel {
        returns: ReturnMatrix::new(dates.clone(), assets, returns),
        factors: FactorMatrix::new(dates, config.factor_names.clone(), factors),
        dropped_dates,
    })
}
