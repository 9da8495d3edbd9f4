#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod estimator;
pub use estimator::{EstimatorError, ExposureEstimator};

mod covariance;
pub use covariance::CovarianceEstimator;
