#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::Symbol;

mod factor;
pub use factor::FactorName;

mod observation;
pub use observation::Observation;

mod matrix;
pub use matrix::{FactorMatrix, ReturnMatrix};

mod weights;
pub use weights::PortfolioWeights;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
