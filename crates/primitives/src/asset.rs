//! Asset identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Asset identifier as it appears in the input table.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a new symbol.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_from_str() {
        let sym: Symbol = "AAA".into();
        assert_eq!(sym.as_str(), "AAA");
        assert_eq!(sym.to_string(), "AAA");
    }

    #[test]
    fn symbols_order_lexicographically() {
        let mut symbols = vec![Symbol::new("C"), Symbol::new("A"), Symbol::new("B")];
        symbols.sort();
        assert_eq!(symbols, vec![Symbol::new("A"), Symbol::new("B"), Symbol::new("C")]);
    }
}
