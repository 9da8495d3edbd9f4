//! Panel configuration.

use hobart_primitives::FactorName;
use serde::{Deserialize, Serialize};

use crate::DataError;

/// Configuration for reading the long-format table and building the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Factors to use, in design-matrix column order.
    pub factor_names: Vec<FactorName>,
    /// Date column name.
    pub date_column: String,
    /// Asset identifier column name.
    pub asset_column: String,
    /// Asset return column name.
    pub return_column: String,
    /// Prefix of factor columns (`factor_` for `factor_Mkt`).
    pub factor_prefix: String,
    /// `chrono` format of string dates.
    pub date_format: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            factor_names: vec![FactorName::new("Mkt"), FactorName::new("SMB")],
            date_column: "date".to_string(),
            asset_column: "asset".to_string(),
            return_column: "return".to_string(),
            factor_prefix: "factor_".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl PanelConfig {
    /// Default configuration with a custom factor list.
    #[must_use]
    pub fn with_factors<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FactorName>,
    {
        Self { factor_names: names.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    /// Number of configured factors.
    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.factor_names.len()
    }

    /// Column names of the configured factors.
    #[must_use]
    pub fn factor_columns(&self) -> Vec<String> {
        self.factor_names.iter().map(|f| f.column(&self.factor_prefix)).collect()
    }

    /// Check that the factor list is non-empty and has no repeats.
    ///
    /// # Errors
    /// Returns `DataError::InvalidParameter` describing the problem.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.factor_names.is_empty() {
            return Err(DataError::InvalidParameter("at least one factor is required".to_string()));
        }
        for (i, name) in self.factor_names.iter().enumerate() {
            if self.factor_names[..i].contains(name) {
                return Err(DataError::InvalidParameter(format!("factor {name} listed twice")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factors() {
        let config = PanelConfig::default();
        assert_eq!(config.factor_columns(), vec!["factor_Mkt", "factor_SMB"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_factors() {
        let config = PanelConfig::with_factors(["Mkt", "SMB", "HML"]);
        assert_eq!(config.n_factors(), 3);
        assert_eq!(config.return_column, "return");
    }

    #[test]
    fn invalid_factor_lists() {
        assert!(PanelConfig::with_factors(Vec::<&str>::new()).validate().is_err());
        assert!(PanelConfig::with_factors(["Mkt", "Mkt"]).validate().is_err());
    }
}
