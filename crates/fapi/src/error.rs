//! Error types for index computations.

use thiserror::Error;

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, FapiError>;

/// Errors that can occur while computing the forecast-shift index.
#[derive(Debug, Error)]
pub enum FapiError {
    /// Evaluation month has no prior month in the same year
    #[error("Invalid evaluation month {month}: no prior month in scope (expected 2..=12)")]
    InvalidEvaluationMonth {
        /// Month that was rejected
        month: u32,
    },

    /// Calendar date could not be constructed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Denominator of a ratio was zero for the given key
    #[error("Division by zero in {stage} for {key}")]
    DivisionByZero {
        /// Stage that detected the degenerate denominator
        stage: &'static str,
        /// Offending security, industry or institution
        key: String,
    },

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}
