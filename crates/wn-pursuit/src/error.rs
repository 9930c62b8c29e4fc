//! Pursuit error type.

use thiserror::Error;

use wn_core::CoreError;

#[derive(Debug, Error, PartialEq)]
pub enum PursuitError {
    #[error("invalid pursuit parameter: {0}")]
    Config(#[from] CoreError),
}

pub type PursuitResult<T> = Result<T, PursuitError>;
