//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while stepping the process model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid parameter: {0}")]
    Parameter(#[from] rf_core::RfError),

    /// A post-step state check failed. The state that produced it must not be
    /// published or stepped further.
    #[error("Invariant violated: {what} = {value}")]
    InvariantViolated { what: String, value: f64 },
}

pub type SimResult<T> = Result<T, SimError>;
