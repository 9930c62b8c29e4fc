//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! `#[from]` variant where configuration validation is shared.

use thiserror::Error;

/// Errors raised while validating core configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("{what} must be positive (got {value})")]
    NonPositive { what: &'static str, value: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `wn-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Reject zero, negative, and NaN values for a named parameter.
pub fn ensure_positive(what: &'static str, value: f64) -> CoreResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::NonPositive { what, value })
    }
}
