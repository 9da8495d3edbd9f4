#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod exposures;
pub use exposures::{ExposureConfig, ExposureEstimate, OlsExposureEstimator, estimate_exposures};

mod covariance;
pub use covariance::{
    CovarianceConfig, FactorCovariance, SampleCovarianceEstimator, estimate_factor_covariance,
};

mod decomposition;
pub use decomposition::{
    DecompositionConfig, FactorContribution, RiskComponent, RiskDecomposer, RiskDecomposition,
    decompose_portfolio_risk,
};

mod pipeline;
pub use pipeline::{RiskModel, RiskModelConfig, align_weights};

mod report;
pub use report::RiskReport;

mod error;
pub use error::{ErrorKind, ModelError};

/// Re-export commonly used types.
pub mod prelude {
    pub use hobart_data::{PanelConfig, build_panel};
    pub use hobart_primitives::{FactorName, Observation, PortfolioWeights, Symbol};
    pub use hobart_traits::{CovarianceEstimator, ExposureEstimator};

    pub use super::{ErrorKind, ModelError, RiskModel, RiskModelConfig, RiskReport};
}
