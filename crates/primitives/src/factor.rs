//! Factor identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Name of a factor, without the column prefix (e.g. `Mkt` for `factor_Mkt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorName(pub String);

impl FactorName {
    /// Create a new factor name.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the factor name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Column name of this factor in a long-format table.
    #[must_use]
    pub fn column(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }
}

impl From<&str> for FactorName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FactorName {
    fn from(s: String) -> Self {
        Self(s)
    }
}
