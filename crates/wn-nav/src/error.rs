//! Navigation error type.

use thiserror::Error;

use wn_core::CoreError;

/// Configuration errors.  Runtime navigation problems (unreachable targets,
/// stalls, missing waypoints) are never errors; they degrade to retry or
/// idle behaviour.
#[derive(Debug, Error, PartialEq)]
pub enum NavError {
    #[error("invalid navigation parameter: {0}")]
    Config(#[from] CoreError),

    #[error("link probability must be within [0, 1] (got {0})")]
    LinkProbability(f64),
}

pub type NavResult<T> = Result<T, NavError>;
