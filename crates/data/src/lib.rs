#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::PanelConfig;

mod panel;
pub use panel::{Panel, build_panel, build_panel_with_missing};

mod frame;
pub use frame::{FrameObservations, infer_factor_names, observations_from_frame, read_csv};

mod error;
pub use error::DataError;
