//! Error types for the simulation

use thiserror::Error;

/// Simulation error types
#[derive(Error, Debug)]
pub enum SimError {
    /// Scheduling with a delay below zero (or NaN)
    #[error("negative delay disallowed: {0}")]
    NegativeDelay(f64),

    /// Internal pop on an empty heap; unreachable through the public API
    #[error("pop from empty event queue")]
    EmptyQueue,

    /// Indexed lookup of an absent key in a named registry
    #[error("unknown name: {0}")]
    UnknownName(String),

    /// Typed parameter-bag access against a value of the wrong shape
    #[error("parameter '{name}' is not {expected}")]
    ParamType {
        name: String,
        expected: &'static str,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Kernel state that should be unreachable
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Result type alias for simulation operations
pub type SimResult<T> = Result<T, SimError>;
