//! Signal error type.

use thiserror::Error;

use wn_core::{CoreError, SignalId};

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("invalid signal timing: {0}")]
    Timing(#[from] CoreError),

    #[error("signal {0} not found")]
    UnknownSignal(SignalId),
}

pub type SignalResult<T> = Result<T, SignalError>;
