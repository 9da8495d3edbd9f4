//! Error types for panel construction.

use hobart_primitives::{Date, Symbol};

/// Errors that can occur while reading input and aligning the panel.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// More than one row for the same date and asset.
    #[error("duplicate observation for asset {asset} on {date}")]
    DuplicateObservation {
        /// Observation date.
        date: Date,
        /// Asset identifier.
        asset: Symbol,
    },

    /// A row does not carry a configured factor.
    #[error("observation for asset {asset} on {date} has no value for factor {factor}")]
    MissingFactor {
        /// Observation date.
        date: Date,
        /// Asset identifier.
        asset: Symbol,
        /// Factor name.
        factor: String,
    },

    /// A return or factor value is NaN or infinite.
    #[error("non-finite {field} for asset {asset} on {date}")]
    NonFinite {
        /// Observation date.
        date: Date,
        /// Asset identifier.
        asset: Symbol,
        /// Offending field.
        field: String,
    },

    /// A cell could not be interpreted.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// No date has a return for every asset.
    #[error("no date has a return for every asset")]
    EmptyAlignedPanel,

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl DataError {
    /// Whether the error stems from the content of the input table.
    #[must_use]
    pub const fn is_malformed_input(&self) -> bool {
        !matches!(self, Self::EmptyAlignedPanel | Self::InvalidParameter(_))
    }
}
