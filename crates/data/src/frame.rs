//! Reading long-format tables into observations.

use std::path::Path;

use chrono::TimeDelta;
use hobart_primitives::{Date, FactorName, Observation, Symbol};
use polars::prelude::*;
use tracing::{debug, instrument};

use crate::{DataError, Panel, PanelConfig, build_panel_with_missing};

/// Read a CSV file with a header row.
///
/// The whole file is scanned for schema inference so a stray non-numeric
/// cell deep in a return column is reported rather than silently parsed.
///
/// # Errors
/// Returns `DataError::Polars` if the file cannot be read or parsed.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame, DataError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;

    debug!(rows = df.height(), columns = df.width(), "read csv");
    Ok(df)
}

/// Factor names of every column starting with `prefix`, in frame order.
#[must_use]
pub fn infer_factor_names(df: &DataFrame, prefix: &str) -> Vec<FactorName> {
    df.get_column_names()
        .iter()
        .filter_map(|c| c.as_str().strip_prefix(prefix))
        .filter(|name| !name.is_empty())
        .map(FactorName::from)
        .collect()
}

/// Rows of a long-format frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameObservations {
    /// Rows carrying a return.
    pub observations: Vec<Observation>,
    /// `(date, asset)` of rows whose return is null.
    pub missing: Vec<(Date, Symbol)>,
}

impl FrameObservations {
    /// Align the rows into a panel, keeping assets of null-return rows in
    /// the universe.
    ///
    /// # Errors
    /// See [`build_panel_with_missing`].
    pub fn into_panel(&self, config: &PanelConfig) -> Result<Panel, DataError> {
        build_panel_with_missing(&self.observations, &self.missing, config)
    }
}

/// Convert a long-format frame into observations.
///
/// A null return marks the asset as absent on that date: the row is kept
/// in [`FrameObservations::missing`] so the date fails alignment while the
/// asset stays in the universe. Null dates, assets or factor values on rows
/// with a return are errors.
///
/// # Errors
/// - `DataError::MissingColumn` if a configured column is absent.
/// - `DataError::InvalidValue` for non-numeric, unparseable or null cells.
#[instrument(skip_all, fields(rows = df.height()))]
pub fn observations_from_frame(
    df: &DataFrame,
    config: &PanelConfig,
) -> Result<FrameObservations, DataError> {
    config.validate()?;

    let dates = date_values(df, &config.date_column, &config.date_format)?;
    let assets = string_values(df, &config.asset_column)?;
    let returns = float_values(df, &config.return_column)?;
    let factor_columns = config
        .factor_columns()
        .iter()
        .map(|name| float_values(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut observations = Vec::with_capacity(df.height());
    let mut missing = Vec::new();

    for row in 0..df.height() {
        let date = dates[row]
            .ok_or_else(|| DataError::InvalidValue(format!("row {row}: missing date")))?;
        let asset = assets[row]
            .clone()
            .ok_or_else(|| DataError::InvalidValue(format!("row {row}: missing asset")))?;

        let Some(asset_return) = returns[row] else {
            missing.push((date, Symbol::new(asset)));
            continue;
        };

        let factor_values = config
            .factor_names
            .iter()
            .zip(&factor_columns)
            .map(|(name, values)| {
                values[row].map(|v| (name.clone(), v)).ok_or_else(|| {
                    DataError::InvalidValue(format!("row {row}: missing value for factor {name}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        observations.push(Observation::new(date, Symbol::new(asset), asset_return, factor_values));
    }

    debug!(observations = observations.len(), missing = missing.len(), "converted frame");
    Ok(FrameObservations { observations, missing })
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DataError> {
    df.column(name).map_err(|_| DataError::MissingColumn(name.to_string()))
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DataError> {
    let cast = column(df, name)?
        .strict_cast(&DataType::Float64)
        .map_err(|_| DataError::InvalidValue(format!("column {name} is not numeric")))?;

    Ok(cast.f64()?.into_iter().collect())
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DataError> {
    let cast = column(df, name)?.cast(&DataType::String)?;
    Ok(cast.str()?.into_iter().map(|s| s.map(|s| s.trim().to_string())).collect())
}

fn date_values(df: &DataFrame, name: &str, format: &str) -> Result<Vec<Option<Date>>, DataError> {
    let col = column(df, name)?;

    match col.dtype() {
        DataType::Date => {
            let epoch = Date::from_ymd_opt(1970, 1, 1)
                .ok_or_else(|| DataError::InvalidValue("unix epoch".to_string()))?;
            let days = col.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(|d| epoch.checked_add_signed(TimeDelta::days(i64::from(d)))))
                .collect())
        }
        DataType::String => col
            .str()?
            .into_iter()
            .map(|s| {
                s.map(|s| {
                    Date::parse_from_str(s.trim(), format).map_err(|_| {
                        DataError::InvalidValue(format!("cannot parse date '{s}' as {format}"))
                    })
                })
                .transpose()
            })
            .collect(),
        other => Err(DataError::InvalidValue(format!("column {name} has unsupported type {other}"))),
    }
}
