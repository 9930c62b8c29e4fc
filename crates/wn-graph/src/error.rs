//! Graph construction error type.

use thiserror::Error;

use wn_core::NodeId;

/// Errors produced while building a [`WaypointGraph`](crate::WaypointGraph).
///
/// Runtime queries never fail: an empty graph or a dead end degrades to
/// `None` and a log line instead.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("node {from} references {to}, which does not exist")]
    DanglingReference { from: NodeId, to: NodeId },

    #[error("node {0} references itself")]
    SelfReference(NodeId),

    #[error("node {0} has a non-finite position")]
    NonFinitePosition(NodeId),

    #[error("graph exceeds the NodeId range ({0} nodes)")]
    TooManyNodes(usize),
}

pub type GraphResult<T> = Result<T, GraphError>;
