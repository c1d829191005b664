//! The board definition record, used to save a board and load it back.
//!
//! Edges carry copies of their endpoint stations rather than indices; loading matches
//! them back to stations by coordinates. The static blocking relation and river flags
//! are stored, so loading never recomputes geometry.

use crate::board::{Board, Edge, EdgeId, Node};
use crate::card::CardType;
use crate::error::DefinitionError;
use crate::geometry::Point;
use crate::region::Region;
use crate::track_color::TrackColor;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// A station, as stored in a board definition.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NodeRecord {
    #[serde(rename = "type")]
    pub shape: CardType,
    pub tourist: bool,
    pub location: Region,
    pub xy: Point,
    /// Whether this station starts the line of `color`.
    pub start: bool,
    pub color: Option<TrackColor>,
    #[serde(default)]
    pub highlighted: bool,
}

/// A track, as stored in a board definition.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EdgeRecord {
    pub node1: NodeRecord,
    pub node2: NodeRecord,
    pub blocks_edges: Vec<EdgeId>,
    pub blocked: bool,
    pub crosses_river: bool,
    #[serde(default)]
    pub highlighted: bool,
    /// The line that claimed this track.
    #[serde(default)]
    pub color: Option<TrackColor>,
}

/// A whole board: stations in id order, then tracks in id order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BoardDefinition {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            shape: node.shape,
            tourist: node.tourist,
            location: node.region,
            xy: node.xy,
            start: node.start_of.is_some(),
            color: node.start_of,
            highlighted: node.highlighted,
        }
    }
}

impl From<&NodeRecord> for Node {
    fn from(record: &NodeRecord) -> Self {
        let mut node = Node::new(record.shape, record.tourist, record.location, record.xy);
        node.start_of = record.color.filter(|_| record.start);
        node.highlighted = record.highlighted;
        node
    }
}

impl From<&Board> for BoardDefinition {
    fn from(board: &Board) -> Self {
        let nodes: Vec<NodeRecord> = board.nodes().iter().map(NodeRecord::from).collect();
        let edges = board
            .edges()
            .iter()
            .map(|edge| {
                let (a, b) = edge.ends();

                EdgeRecord {
                    node1: nodes[a].clone(),
                    node2: nodes[b].clone(),
                    blocks_edges: edge.blocks().to_vec(),
                    blocked: edge.is_blocked(),
                    crosses_river: edge.crosses_river(),
                    highlighted: edge.is_highlighted(),
                    color: edge.owner(),
                }
            })
            .collect();

        Self { nodes, edges }
    }
}

impl TryFrom<BoardDefinition> for Board {
    type Error = DefinitionError;

    fn try_from(definition: BoardDefinition) -> Result<Self, Self::Error> {
        let nodes: Vec<Node> = definition.nodes.iter().map(Node::from).collect();

        let locate = |record: &NodeRecord| nodes.iter().position(|node| node.xy == record.xy);

        let mut edges = Vec::with_capacity(definition.edges.len());
        for (id, record) in definition.edges.into_iter().enumerate() {
            let ends = match (locate(&record.node1), locate(&record.node2)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(DefinitionError::UnknownEndpoint { edge: id }),
            };

            let mut edge = Edge::new(ends);
            edge.blocks = record.blocks_edges.into_iter().collect();
            edge.crosses_river = record.crosses_river;
            edge.blocked = record.blocked;
            edge.owner = record.color;
            edge.highlighted = record.highlighted;
            edges.push(edge);
        }

        Ok(Board::assemble(nodes, edges)?)
    }
}

impl BoardDefinition {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Board {
    /// Reads a board definition from a JSON file.
    ///
    /// Lines, and which one is being drawn, are not part of a definition:
    /// the board comes back with every line unstarted.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let definition = BoardDefinition::from_json_str(&fs::read_to_string(path)?)?;
        let board = Board::try_from(definition)?;

        info!(
            path = %path.display(),
            nodes = board.nodes().len(),
            edges = board.edges().len(),
            "loaded board"
        );
        Ok(board)
    }

    /// Writes the board, with its current blocking, ownership and highlights, as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DefinitionError> {
        let path = path.as_ref();
        fs::write(path, BoardDefinition::from(self).to_json_string()?)?;

        info!(path = %path.display(), "saved board");
        Ok(())
    }
}
