//! Errors reported by board construction, play, persistence and the game manager.

use crate::board::{EdgeId, NodeId};
use crate::track_color::TrackColor;

/// A board could not be assembled. Fatal: there is no board to play on.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    #[error("nodes {first} and {second} stand at the same position")]
    DuplicatePosition { first: NodeId, second: NodeId },
    #[error("edge {edge} references node {node}, which does not exist")]
    DanglingNode { edge: EdgeId, node: NodeId },
    #[error("edges {first} and {second} connect the same pair of nodes")]
    DuplicateEdge { first: EdgeId, second: EdgeId },
    #[error("edge {edge} connects node {node} to itself")]
    SelfLoop { edge: EdgeId, node: NodeId },
    #[error("edge {edge} blocks edge {index}, which does not exist")]
    BlockIndexOutOfRange { edge: EdgeId, index: usize },
    #[error("edge {edge} blocks edge {other}, but not the other way around")]
    AsymmetricBlocks { edge: EdgeId, other: EdgeId },
}

/// A move was rejected. The board is left exactly as it was before the attempt.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum IllegalMove {
    #[error("there is no start station for the {0} line on this board")]
    NoStartNode(TrackColor),
    #[error("the {0} line is not the one being drawn")]
    ColorNotActive(TrackColor),
    #[error("the {0} line is finished for this game")]
    RoundOver(TrackColor),
    #[error("no track connects station {from} to station {to}")]
    NoSuchEdge { from: NodeId, to: NodeId },
    #[error("track {edge} is blocked")]
    EdgeAlreadyBlocked { edge: EdgeId },
    #[error("station {node} is not on the current line")]
    NotVisited { node: NodeId },
    #[error("no railroad card is waiting to be used")]
    NoSwapPending,
}

/// A board definition could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("could not access board definition: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed board definition: {0}")]
    Json(#[from] serde_json::Error),
    #[error("edge {edge} has an endpoint that matches no station")]
    UnknownEndpoint { edge: EdgeId },
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// A request to the [`crate::manager::Manager`] was refused.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ManagerError {
    #[error("the game is not being played")]
    NotPlaying,
    #[error("a card must be drawn first")]
    NoCardDrawn,
    #[error("station {node} cannot be reached with the current card")]
    IllegalTarget { node: NodeId },
    #[error(transparent)]
    Move(#[from] IllegalMove),
}
