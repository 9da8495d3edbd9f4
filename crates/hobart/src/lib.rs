//! # hobart
//!
//! A time-series factor risk model.
//!
//! Asset returns are regressed on factor returns to estimate exposures and
//! idiosyncratic variances, factor returns give the factor covariance, and
//! the two combine into a portfolio variance split into factor and specific
//! risk.
//!
//! This crate re-exports the component crates behind feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Estimator traits
//! - `math`: Least squares, moments and quadratic forms
//! - `data`: Panel construction and CSV input
//! - `model`: Exposures, factor covariance and risk decomposition
//! - `parallel`: Per-asset regressions on the rayon pool
//! - `cli`: The `decompose` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use hobart::model::prelude::*;
//!
//! let model = RiskModel::with_config(RiskModelConfig {
//!     panel: PanelConfig::with_factors(["Mkt", "SMB"]),
//!     ..Default::default()
//! });
//! let report = model.run(&observations, None)?;
//! report.print_summary();
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Used only by the `decompose` binary.
#[cfg(feature = "cli")]
use {clap as _, serde_json as _, tracing_subscriber as _};

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use hobart_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use hobart_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use hobart_math as math;
#[cfg(feature = "data")]
#[doc(inline)]
pub use hobart_data as data;
#[cfg(feature = "model")]
#[doc(inline)]
pub use hobart_model as model;
