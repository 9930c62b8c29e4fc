use thiserror::Error;

use wn_core::{AgentId, CoreError, NodeId};
use wn_nav::NavError;
use wn_pursuit::PursuitError;
use wn_signal::SignalError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    Pursuit(#[from] PursuitError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("spawn node {0} is not in the waypoint graph")]
    UnknownNode(NodeId),

    #[error("invalid spawn request: {0}")]
    InvalidSpawn(&'static str),

    #[error("agent {0} is not a navigating agent")]
    NotNavigating(AgentId),

    #[error("agent id space exhausted")]
    TooManyAgents,
}

pub type SimResult<T> = Result<T, SimError>;
