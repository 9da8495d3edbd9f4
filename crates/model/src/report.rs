//! Risk report produced by a model run.

use std::fmt;

use hobart_primitives::Date;
use serde::Serialize;

use crate::{ExposureEstimate, FactorCovariance, ModelError, RiskDecomposition};

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    /// First aligned date.
    pub start_date: Date,
    /// Last aligned date.
    pub end_date: Date,
    /// Number of aligned dates used in estimation.
    pub n_dates: usize,
    /// Dates dropped during alignment.
    pub dropped_dates: Vec<Date>,
    /// Exposures and idiosyncratic variances.
    pub exposures: ExposureEstimate,
    /// Factor covariance.
    pub covariance: FactorCovariance,
    /// Portfolio risk decomposition.
    pub decomposition: RiskDecomposition,
}

impl RiskReport {
    /// Assemble a report over the aligned `dates`.
    ///
    /// # Errors
    /// Returns `ModelError::EmptyAlignedPanel` if `dates` is empty.
    pub fn new(
        dates: Vec<Date>,
        dropped_dates: Vec<Date>,
        exposures: ExposureEstimate,
        covariance: FactorCovariance,
        decomposition: RiskDecomposition,
    ) -> Result<Self, ModelError> {
        let (Some(&start_date), Some(&end_date)) = (dates.first(), dates.last()) else {
            return Err(ModelError::EmptyAlignedPanel);
        };

        Ok(Self {
            start_date,
            end_date,
            n_dates: dates.len(),
            dropped_dates,
            exposures,
            covariance,
            decomposition,
        })
    }

    /// Human-readable summary.
    #[must_use]
    pub fn render_summary(&self) -> String {
        self.to_string()
    }

    /// Print the summary to stdout.
    pub fn print_summary(&self) {
        println!("{self}");
    }

    fn fmt_exposures(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let est = &self.exposures;

        writeln!(f, "\nFACTOR EXPOSURES:")?;
        write!(f, "{:<12}", "Asset")?;
        for factor in &est.factors {
            write!(f, " {:>10}", factor.as_str())?;
        }
        writeln!(f, " {:>12} {:>8}", "Spec Var", "R²")?;

        for (i, asset) in est.assets.iter().enumerate() {
            write!(f, "{:<12}", asset.as_str())?;
            for b in est.exposures.row(i) {
                write!(f, " {b:>10.3}")?;
            }
            writeln!(f, " {:>12.6} {:>8.3}", est.specific_variances[i], est.r_squared[i])?;
        }

        if est.rank_deficient {
            writeln!(
                f,
                "  warning: factor design has rank {} < {} factors",
                est.rank,
                est.n_factors()
            )?;
        }
        Ok(())
    }

    fn fmt_covariance(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cov = &self.covariance;

        writeln!(f, "\nFACTOR COVARIANCE ({}):", cov.dof)?;
        write!(f, "{:<12}", "")?;
        for factor in &cov.factors {
            write!(f, " {:>10}", factor.as_str())?;
        }
        writeln!(f)?;

        for (i, factor) in cov.factors.iter().enumerate() {
            write!(f, "{:<12}", factor.as_str())?;
            for c in cov.matrix.row(i) {
                write!(f, " {c:>10.4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn fmt_decomposition(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.decomposition;

        writeln!(f, "\nRISK DECOMPOSITION:")?;
        writeln!(f, "{:<20} {:>14} {:>10}", "Component", "Variance", "Share")?;
        writeln!(f, "{:-<20} {:-^14} {:-^10}", "", "", "")?;
        for component in d.components() {
            writeln!(
                f,
                "{:<20} {:>14.4} {:>9.1}%",
                component.label, component.variance, component.percent
            )?;
        }
        writeln!(f, "{:-<20} {:-^14} {:-^10}", "", "", "")?;
        writeln!(f, "{:<20} {:>14.4} {:>10}", "TOTAL", d.total_variance, "")?;

        writeln!(f, "\nFACTOR CONTRIBUTIONS:")?;
        writeln!(f, "{:<20} {:>12} {:>14} {:>10}", "Factor", "Exposure", "Variance", "Share")?;
        writeln!(f, "{:-<20} {:-^12} {:-^14} {:-^10}", "", "", "", "")?;
        for c in &d.factor_contributions {
            writeln!(
                f,
                "{:<20} {:>12.3} {:>14.4} {:>9.1}%",
                c.factor.as_str(),
                c.exposure,
                c.variance,
                c.percent_of_total
            )?;
        }

        writeln!(f, "\n{THIN_RULE}")?;
        writeln!(f, "SUMMARY:")?;
        writeln!(f, "  Portfolio Variance:  {:>10.4}", d.total_variance)?;
        writeln!(f, "  Portfolio Volatility:{:>9.2}%", d.volatility * 100.0)?;
        writeln!(f, "  Factor Risk:         {:>9.1}%", d.factor_share)?;
        writeln!(f, "  Specific Risk:       {:>9.1}%", d.specific_share)
    }
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "FACTOR RISK MODEL")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Period: {} to {} ({} dates)", self.start_date, self.end_date, self.n_dates)?;
        if !self.dropped_dates.is_empty() {
            writeln!(f, "Dropped {} incomplete dates", self.dropped_dates.len())?;
        }
        writeln!(f, "{THIN_RULE}")?;

        self.fmt_exposures(f)?;
        self.fmt_covariance(f)?;
        self.fmt_decomposition(f)?;

        write!(f, "{RULE}")
    }
}
