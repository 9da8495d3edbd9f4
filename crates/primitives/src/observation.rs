//! Long-format observations.

use serde::{Deserialize, Serialize};

use crate::{Date, FactorName, Symbol};

/// One row of the input table: an asset return on a date, together with the
/// factor returns recorded on that row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date.
    pub date: Date,
    /// Asset identifier.
    pub asset: Symbol,
    /// Asset return.
    pub asset_return: f64,
    /// Factor values keyed by factor name.
    pub factor_values: Vec<(FactorName, f64)>,
}

impl Observation {
    /// Create a new observation.
    #[must_use]
    pub const fn new(
        date: Date,
        asset: Symbol,
        asset_return: f64,
        factor_values: Vec<(FactorName, f64)>,
    ) -> Self {
        Self { date, asset, asset_return, factor_values }
    }

    /// Get the value of a factor by name.
    #[must_use]
    pub fn factor(&self, name: &str) -> Option<f64> {
        self.factor_values.iter().find(|(n, _)| n.as_str() == name).map(|(_, v)| *v)
    }

    /// Number of factor values carried by this row.
    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.factor_values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_factor_lookup() {
        let obs = Observation::new(
            Date::from_ymd_opt(2024, 1, 2).unwrap(),
            Symbol::new("AAA"),
            0.01,
            vec![(FactorName::new("Mkt"), 0.005), (FactorName::new("SMB"), -0.002)],
        );

        assert_eq!(obs.factor("Mkt"), Some(0.005));
        assert_eq!(obs.factor("SMB"), Some(-0.002));
        assert_eq!(obs.factor("HML"), None);
        assert_eq!(obs.n_factors(), 2);
    }
}
