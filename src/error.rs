use thiserror::Error;

use crate::params::collection::SerializationError;
use crate::transforms::bounds::BoundsError;

/// Error types for the gpparams-rs library.
///
/// Element-wise transforms never return these: domain violations there show up
/// as non-finite values. Errors are reserved for contract violations and for the
/// opt-in validation layer.
#[derive(Error, Debug)]
pub enum GpParamsError {
    /// A value lies outside the domain of the transformation applied to it.
    #[error("Value {value} of parameter '{key}' is outside the domain of the {transformation} transformation")]
    DomainViolation {
        key: String,
        value: f64,
        transformation: String,
    },

    /// Two collections that must share a key set do not.
    #[error("Parameter key mismatch: {0}")]
    KeyMismatch(String),

    /// Values under the same key have incompatible shapes.
    #[error("Shape mismatch for parameter '{key}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        key: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Invalid fitting configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The objective produced a NaN or infinite loss.
    #[error("Objective returned a non-finite loss at iteration {iteration}")]
    NonFiniteLoss { iteration: usize },

    /// Error raised by a user objective.
    #[error("Objective evaluation error: {0}")]
    ObjectiveEvaluation(String),

    /// Error for boundary definitions.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// Persistence error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

/// Result type alias for gpparams-rs operations.
pub type Result<T> = std::result::Result<T, GpParamsError>;

impl From<String> for GpParamsError {
    fn from(s: String) -> Self {
        GpParamsError::ObjectiveEvaluation(s)
    }
}

impl From<&str> for GpParamsError {
    fn from(s: &str) -> Self {
        GpParamsError::ObjectiveEvaluation(s.to_string())
    }
}
