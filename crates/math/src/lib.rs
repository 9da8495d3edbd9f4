#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod linalg;
pub use linalg::{LstsqResult, Svd, SvdSolver, jacobi_svd, least_squares};

mod moments;
pub use moments::{DegreesOfFreedom, covariance_matrix, mean, variance};

mod quadratic;
pub use quadratic::{diagonal_quadratic_form, quadratic_form, sandwich};

mod error;
pub use error::MathError;
