use crate::tree::{NodeId, NodeKind};

/// Failures when mutating a [`Document`](crate::Document).
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),
    #[error("Node kind {0:?} cannot be created this way")]
    WrongKind(NodeKind),
    #[error("Node {0} does not carry its own text")]
    NotText(NodeId),
    #[error("The root node cannot be detached")]
    DetachRoot,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown granularity: {0}")]
pub struct ParseGranularityError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown navigation action: {0}")]
pub struct ParseActionError(pub String);
