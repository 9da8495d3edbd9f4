//! Portfolio weight definitions.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Portfolio holdings aligned to the asset order of a return matrix.
///
/// Weights are not required to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioWeights {
    /// Assets, in return-matrix column order.
    pub assets: Vec<Symbol>,
    /// Weight per asset.
    pub weights: Array1<f64>,
}

impl PortfolioWeights {
    /// Create portfolio weights.
    #[must_use]
    pub fn new(assets: Vec<Symbol>, weights: Array1<f64>) -> Self {
        debug_assert_eq!(assets.len(), weights.len());
        Self { assets, weights }
    }

    /// Equal weight `1 / n` on every asset.
    #[must_use]
    pub fn equal_weight(assets: Vec<Symbol>) -> Self {
        let n = assets.len();
        let weights =
            if n == 0 { Array1::zeros(0) } else { Array1::from_elem(n, 1.0 / n as f64) };
        Self { assets, weights }
    }

    /// Number of assets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Sum of weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.sum()
    }

    /// Whether every weight is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite())
    }

    /// Get the weight of a specific asset.
    #[must_use]
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.assets.iter().position(|a| a.as_str() == asset).map(|i| self.weights[i])
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn equal_weight_sums_to_one() {
        let weights = PortfolioWeights::equal_weight(vec![
            Symbol::new("A"),
            Symbol::new("B"),
            Symbol::new("C"),
            Symbol::new("D"),
        ]);

        assert_eq!(weights.len(), 4);
        assert!((weights.total() - 1.0).abs() < 1e-12);
        assert_eq!(weights.get("C"), Some(0.25));
    }

    #[test]
    fn equal_weight_empty() {
        let weights = PortfolioWeights::equal_weight(Vec::new());
        assert!(weights.is_empty());
        assert_eq!(weights.total(), 0.0);
    }

    #[test]
    fn non_finite_weights_detected() {
        let weights =
            PortfolioWeights::new(vec![Symbol::new("A"), Symbol::new("B")], array![0.5, f64::NAN]);
        assert!(!weights.is_finite());
    }
}
