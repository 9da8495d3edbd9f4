//! Error types for risk model estimation.

use hobart_data::DataError;
use hobart_math::MathError;
use hobart_traits::EstimatorError;

/// Category of a [`ModelError`], for callers that branch on the failure
/// rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input table or caller-supplied values are unusable.
    MalformedInput,
    /// No date survived alignment.
    EmptyAlignedPanel,
    /// Too few aligned dates for the requested estimate.
    InsufficientObservations,
    /// Floating-point breakdown beyond tolerance.
    NumericInstability,
    /// The model configuration is invalid.
    InvalidConfig,
}

/// Errors that can occur during a risk model run.
///
/// Every error is terminal for the run; no partial result is produced.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Missing columns, duplicate rows, non-numeric or misaligned values.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// No date has a return for every asset.
    #[error("empty aligned panel: no date has a return for every asset")]
    EmptyAlignedPanel,

    /// Too few aligned dates.
    #[error("insufficient observations: need at least {required}, got {actual}")]
    InsufficientObservations {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Negative variance or broken variance identity beyond tolerance.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    /// Inputs to a pipeline stage do not fit together.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) | Self::DimensionMismatch(_) => ErrorKind::MalformedInput,
            Self::EmptyAlignedPanel => ErrorKind::EmptyAlignedPanel,
            Self::InsufficientObservations { .. } => ErrorKind::InsufficientObservations,
            Self::NumericInstability(_) => ErrorKind::NumericInstability,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}

impl From<DataError> for ModelError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::EmptyAlignedPanel => Self::EmptyAlignedPanel,
            DataError::InvalidParameter(msg) => Self::InvalidConfig(msg),
            other => Self::MalformedInput(other.to_string()),
        }
    }
}

impl From<MathError> for ModelError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientObservations { required, actual } => {
                Self::InsufficientObservations { required, actual }
            }
            MathError::DimensionMismatch { .. } => Self::DimensionMismatch(err.to_string()),
            MathError::EmptyData => Self::MalformedInput(err.to_string()),
            MathError::NumericalInstability(msg) | MathError::LinearAlgebra(msg) => {
                Self::NumericInstability(msg)
            }
        }
    }
}

impl From<EstimatorError> for ModelError {
    fn from(err: EstimatorError) -> Self {
        match err {
            EstimatorError::InsufficientData { required, actual } => {
                Self::InsufficientObservations { required, actual }
            }
            EstimatorError::RankDeficient { .. } => Self::NumericInstability(err.to_string()),
            EstimatorError::DimensionMismatch { .. } => Self::DimensionMismatch(err.to_string()),
            EstimatorError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            EstimatorError::NumericalInstability(msg) | EstimatorError::LinearAlgebra(msg) => {
                Self::NumericInstability(msg)
            }
        }
    }
}

/// Map a math error onto the estimator trait's error type.
pub(crate) fn estimator_error(err: MathError) -> EstimatorError {
    match err {
        MathError::InsufficientObservations { required, actual } => {
            EstimatorError::InsufficientData { required, actual }
        }
        MathError::DimensionMismatch { expected, actual } => {
            EstimatorError::DimensionMismatch { expected, actual, context: "design".to_string() }
        }
        MathError::NumericalInstability(msg) => EstimatorError::NumericalInstability(msg),
        other => EstimatorError::LinearAlgebra(other.to_string()),
    }
}
