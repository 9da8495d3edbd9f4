//! Date-aligned return and factor matrices.

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::{Date, FactorName, Symbol};

/// Asset returns on a common date index (n_dates x n_assets).
///
/// Every cell is populated: dates on which any asset was missing are never
/// part of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMatrix {
    /// Row index, ascending.
    pub dates: Vec<Date>,
    /// Column index.
    pub assets: Vec<Symbol>,
    /// Return values (n_dates x n_assets).
    pub values: Array2<f64>,
}

impl ReturnMatrix {
    /// Create a new return matrix.
    #[must_use]
    pub fn new(dates: Vec<Date>, assets: Vec<Symbol>, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.dim(), (dates.len(), assets.len()));
        Self { dates, assets, values }
    }

    /// Number of dates.
    #[must_use]
    pub const fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of assets.
    #[must_use]
    pub const fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// Check if the matrix has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Get the column index of an asset.
    #[must_use]
    pub fn asset_index(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.as_str() == asset)
    }

    /// Return series of a single asset.
    #[must_use]
    pub fn series(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
        self.asset_index(asset).map(|j| self.values.index_axis(Axis(1), j))
    }
}

/// Factor returns on a common date index (n_dates x n_factors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorMatrix {
    /// Row index, ascending.
    pub dates: Vec<Date>,
    /// Column index, in configured factor order.
    pub factors: Vec<FactorName>,
    /// Factor return values (n_dates x n_factors).
    pub values: Array2<f64>,
}

impl FactorMatrix {
    /// Create a new factor matrix.
    #[must_use]
    pub fn new(dates: Vec<Date>, factors: Vec<FactorName>, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.dim(), (dates.len(), factors.len()));
        Self { dates, factors, values }
    }

    /// Number of dates.
    #[must_use]
    pub const fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of factors.
    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.factors.len()
    }

    /// Check if the matrix has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Get the column index of a factor.
    #[must_use]
    pub fn factor_index(&self, name: &str) -> Option<usize> {
        self.factors.iter().position(|f| f.as_str() == name)
    }

    /// Return series of a single factor.
    #[must_use]
    pub fn series(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.factor_index(name).map(|j| self.values.index_axis(Axis(1), j))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn dates() -> Vec<Date> {
        vec![Date::from_ymd_opt(2024, 1, 2).unwrap(), Date::from_ymd_opt(2024, 1, 3).unwrap()]
    }

    #[test]
    fn return_matrix_series() {
        let m = ReturnMatrix::new(
            dates(),
            vec![Symbol::new("A"), Symbol::new("B")],
            array![[0.01, 0.02], [0.03, 0.04]],
        );

        assert_eq!(m.n_dates(), 2);
        assert_eq!(m.n_assets(), 2);
        assert_eq!(m.asset_index("B"), Some(1));
        assert_eq!(m.series("B").unwrap().to_vec(), vec![0.02, 0.04]);
        assert!(m.series("C").is_none());
    }

    #[test]
    fn factor_matrix_series() {
        let m = FactorMatrix::new(
            dates(),
            vec![FactorName::new("Mkt"), FactorName::new("SMB")],
            array![[0.001, 0.002], [0.003, 0.004]],
        );

        assert_eq!(m.n_factors(), 2);
        assert_eq!(m.factor_index("SMB"), Some(1));
        assert_eq!(m.series("Mkt").unwrap().to_vec(), vec![0.001, 0.003]);
    }
}
