use crate::card::CardType;
use crate::error::ConstructionError;
use crate::geometry::{segments_intersect, Point, River};
use crate::region::Region;
use crate::track_color::TrackColor;

use array_init::array_init;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use strum::EnumCount;
use threadpool::ThreadPool;
use tracing::{debug, warn};

lazy_static! {
    static ref THREAD_POOL: Mutex<ThreadPool> = Mutex::new(ThreadPool::default());
}

/// Stable index of a station, assigned in insertion order when the board is built.
pub type NodeId = usize;

/// Stable index of a track segment, assigned in insertion order when the board is built.
pub type EdgeId = usize;

// A station on the default board has at most 8 neighbours.
const MAX_EDGES_PER_NODE: usize = 8;

// Crossing tracks are few on a planar-ish board.
const MAX_BLOCKED_PER_EDGE: usize = 4;

/// Edges leaving a single station, in edge-index order.
type IncidentEdges = SmallVec<[EdgeId; MAX_EDGES_PER_NODE]>;

/// The static set of edges that geometrically cross a given edge.
pub type BlocksSet = SmallVec<[EdgeId; MAX_BLOCKED_PER_EDGE]>;

/// A station of the board.
///
/// Everything but the highlight is fixed once the board is built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub shape: CardType,
    pub tourist: bool,
    pub region: Region,
    /// Only used to derive geometry, and by renderers.
    pub xy: Point,
    /// Set on the station each line starts from.
    pub start_of: Option<TrackColor>,
    pub(crate) highlighted: bool,
}

impl Node {
    pub fn new(shape: CardType, tourist: bool, region: Region, xy: Point) -> Self {
        Self {
            shape,
            tourist,
            region,
            xy,
            start_of: None,
            highlighted: false,
        }
    }

    /// Marks this station as the start of the `color` line.
    pub fn starting(mut self, color: TrackColor) -> Self {
        self.start_of = Some(color);
        self
    }

    /// UI hint only; never consulted by the rules.
    #[inline]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

/// A track segment between two stations.
///
/// `blocks` and `crosses_river` are computed once from the board's geometry.
/// The remaining fields change as lines are drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub(crate) ends: (NodeId, NodeId),
    pub(crate) blocks: BlocksSet,
    pub(crate) crosses_river: bool,
    pub(crate) blocked: bool,
    pub(crate) owner: Option<TrackColor>,
    pub(crate) highlighted: bool,
}

impl Edge {
    pub(crate) fn new(ends: (NodeId, NodeId)) -> Self {
        Self {
            ends,
            blocks: BlocksSet::new(),
            crosses_river: false,
            blocked: false,
            owner: None,
            highlighted: false,
        }
    }

    #[inline]
    pub fn ends(&self) -> (NodeId, NodeId) {
        self.ends
    }

    /// Whether this edge links `a` and `b`, in either direction.
    #[inline]
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        self.ends == (a, b) || self.ends == (b, a)
    }

    /// The endpoint across from `node`, if `node` is an endpoint at all.
    #[inline]
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        match self.ends {
            (a, b) if a == node => Some(b),
            (a, b) if b == node => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn shares_endpoint_with(&self, other: &Edge) -> bool {
        let (a, b) = other.ends;
        self.other_end(a).is_some() || self.other_end(b).is_some()
    }

    /// Edges that become unusable once this one is claimed.
    #[inline]
    pub fn blocks(&self) -> &[EdgeId] {
        &self.blocks
    }

    #[inline]
    pub fn crosses_river(&self) -> bool {
        self.crosses_river
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// The line that claimed this edge, if any.
    #[inline]
    pub fn owner(&self) -> Option<TrackColor> {
        self.owner
    }

    #[inline]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

/// Everything a line has drawn so far.
///
/// A station may appear more than once in `visited`; scoring deduplicates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Track {
    pub(crate) visited: Vec<NodeId>,
    pub(crate) claimed: Vec<EdgeId>,
}

impl Track {
    #[inline]
    pub fn visited(&self) -> &[NodeId] {
        &self.visited
    }

    #[inline]
    pub fn claimed(&self) -> &[EdgeId] {
        &self.claimed
    }
}

/// States of a line in the claim state machine.
///
/// # JSON
/// Phases are serialized in snake_case.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackPhase {
    /// The line has not been drawn yet this game.
    Unstarted,
    /// The line is being drawn from its current station.
    Active,
    /// A railroad card was drawn: the next move may start from any station of the line.
    AwaitingSwap,
    /// The round of this line is over; it accepts no further claims.
    Finished,
}

/// The authoritative state of the board, for a whole game.
///
/// The station and track sets are fixed at construction. Only highlights, blocking,
/// ownership and the per-line records change during play, through [`Board::claim`]
/// and the other transitions of the claim state machine.
/// Mutation needs `&mut self`; reads may be shared between threads.
#[derive(Debug)]
pub struct Board {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    incident: Vec<IncidentEdges>,
    pub(crate) tracks: [Track; TrackColor::COUNT],
    pub(crate) phases: [TrackPhase; TrackColor::COUNT],
    pub(crate) active: Option<TrackColor>,
    pub(crate) cursor: Option<NodeId>,
    /// Set by a railroad card, cleared by the next legal-move query that uses it.
    /// Queries take `&self`, so this is atomic; the board stays shareable between threads.
    pub(crate) swap_pending: AtomicBool,
}

impl Board {
    /// Assembles a board from stations and fully described edges.
    ///
    /// Checks that no two stations share a position, that every edge is well formed,
    /// that no two edges join the same stations, and that the static blocking relation
    /// is in range and symmetric.
    pub(crate) fn assemble(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, ConstructionError> {
        // Definitions refer to stations by position.
        for (second, node) in nodes.iter().enumerate() {
            if let Some(first) = nodes[..second].iter().position(|other| other.xy == node.xy) {
                return Err(ConstructionError::DuplicatePosition { first, second });
            }
        }

        let mut incident: Vec<IncidentEdges> = vec![SmallVec::new(); nodes.len()];
        let mut seen_pairs = HashMap::with_capacity(edges.len());

        for (id, edge) in edges.iter().enumerate() {
            let (a, b) = edge.ends;
            for node in [a, b] {
                if node >= nodes.len() {
                    return Err(ConstructionError::DanglingNode { edge: id, node });
                }
            }

            if a == b {
                return Err(ConstructionError::SelfLoop { edge: id, node: a });
            }

            if let Some(first) = seen_pairs.insert((a.min(b), a.max(b)), id) {
                return Err(ConstructionError::DuplicateEdge { first, second: id });
            }

            incident[a].push(id);
            incident[b].push(id);
        }

        for (id, edge) in edges.iter().enumerate() {
            for &other in edge.blocks.iter() {
                match edges.get(other) {
                    None => {
                        return Err(ConstructionError::BlockIndexOutOfRange { edge: id, index: other })
                    }
                    Some(blocked) if !blocked.blocks.contains(&id) => {
                        return Err(ConstructionError::AsymmetricBlocks { edge: id, other })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Self {
            nodes,
            edges,
            incident,
            tracks: array_init(|_| Track::default()),
            phases: [TrackPhase::Unstarted; TrackColor::COUNT],
            active: None,
            cursor: None,
            swap_pending: AtomicBool::new(false),
        })
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Edges leaving `node`, in edge-index order.
    #[inline]
    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        self.incident.get(node).map_or(&[], |edges| edges.as_slice())
    }

    /// The edge joining `a` and `b`, if there is one.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.incident_edges(a)
            .iter()
            .copied()
            .find(|&edge| self.edges[edge].connects(a, b))
    }

    /// The station the `color` line starts from, if the board has one.
    pub fn start_node(&self, color: TrackColor) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.start_of == Some(color))
    }

    #[inline]
    pub fn track(&self, color: TrackColor) -> &Track {
        &self.tracks[color.index()]
    }

    #[inline]
    pub fn phase(&self, color: TrackColor) -> TrackPhase {
        self.phases[color.index()]
    }

    /// The line currently being drawn.
    #[inline]
    pub fn active_color(&self) -> Option<TrackColor> {
        self.active
    }

    /// The station the active line continues from.
    #[inline]
    pub fn current_node(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Whether the next non-railroad legal-move query will start from every visited station.
    #[inline]
    pub fn swap_pending(&self) -> bool {
        self.swap_pending.load(Ordering::Relaxed)
    }

    /// Whether the active line has no railroad card waiting to be resolved.
    #[inline]
    pub fn swap_resolved(&self) -> bool {
        self.active
            .map_or(true, |color| self.phase(color) != TrackPhase::AwaitingSwap)
    }
}

/// Collects the stations and tracks of a board, then derives the static blocking
/// relation and the river crossings in a single pass.
///
/// # Example
/// ```
/// use london_system::board::{BoardBuilder, Node};
/// use london_system::card::CardType;
/// use london_system::geometry::Point;
/// use london_system::region::Region;
///
/// let mut builder = BoardBuilder::new();
/// let a = builder.add_node(Node::new(CardType::Circle, false, Region::TopMiddle, Point::new(0.0, 0.0)));
/// let b = builder.add_node(Node::new(CardType::Square, false, Region::TopMiddle, Point::new(1.0, 1.0)));
/// let c = builder.add_node(Node::new(CardType::Square, false, Region::TopMiddle, Point::new(0.0, 1.0)));
/// let d = builder.add_node(Node::new(CardType::Circle, false, Region::TopMiddle, Point::new(1.0, 0.0)));
/// let diagonal = builder.add_edge(a, b);
/// let other_diagonal = builder.add_edge(c, d);
///
/// let board = builder.build().unwrap();
/// assert_eq!(board.edge(diagonal).unwrap().blocks(), &[other_diagonal]);
/// assert_eq!(board.edge(other_diagonal).unwrap().blocks(), &[diagonal]);
/// ```
#[derive(Debug, Default)]
pub struct BoardBuilder {
    nodes: Vec<Node>,
    edges: Vec<(NodeId, NodeId)>,
    river: Option<River>,
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a station and returns its id.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Adds a track between two stations and returns its id.
    /// The stations are validated by [`BoardBuilder::build`].
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> EdgeId {
        self.edges.push((a, b));
        self.edges.len() - 1
    }

    /// Sets the river that tracks are tested against.
    pub fn river(&mut self, river: River) -> &mut Self {
        self.river = Some(river);
        self
    }

    /// Validates the board and derives its static relations.
    ///
    /// Every unordered pair of edges that do not share a station is tested for intersection,
    /// and every edge is tested against the river. Rows of this O(E²) pass are computed on
    /// the shared thread pool.
    pub fn build(self) -> Result<Board, ConstructionError> {
        let Self {
            nodes,
            edges: ends,
            river,
        } = self;

        let edges: Vec<Edge> = ends.iter().map(|&ends| Edge::new(ends)).collect();
        // Validate topology before touching geometry, so that positions can be indexed freely.
        let mut board = Board::assemble(nodes, edges)?;

        let segments: Arc<Vec<(Point, Point)>> = Arc::new(
            ends.iter()
                .map(|&(a, b)| (board.nodes[a].xy, board.nodes[b].xy))
                .collect(),
        );
        let ends = Arc::new(ends);
        let river = river.map(Arc::new);

        if let Some(river) = &river {
            let shortest_edge = segments
                .iter()
                .map(|(a, b)| a.distance(*b))
                .fold(f64::INFINITY, f64::min);

            if river.polyline().len() > 1 && river.max_gap() >= shortest_edge {
                warn!(
                    max_gap = river.max_gap(),
                    shortest_edge, "river is sampled too coarsely to catch every crossing"
                );
            }
        }

        let (tx, rx) = mpsc::channel();
        let thread_pool = THREAD_POOL.lock().unwrap_or_else(PoisonError::into_inner);

        // Each edge gets a job computing whether it crosses the river, and which edges
        // with a greater id it intersects.
        for edge in 0..segments.len() {
            let segments = segments.clone();
            let ends = ends.clone();
            let river = river.clone();
            let tx = tx.clone();

            thread_pool.execute(move || {
                let (a1, a2) = segments[edge];
                let (p, q) = ends[edge];

                let crosses_river = river
                    .as_ref()
                    .map_or(false, |river| river.is_crossed_by(a1, a2));

                let crossings: Vec<EdgeId> = (edge + 1..segments.len())
                    .filter(|&other| {
                        let (r, s) = ends[other];
                        let shares_station = p == r || p == s || q == r || q == s;
                        let (b1, b2) = segments[other];

                        !shares_station && segments_intersect(a1, a2, b1, b2)
                    })
                    .collect();

                tx.send((edge, crosses_river, crossings))
                    .expect("receiver outlives every construction job");
            });
        }
        drop(tx);

        let mut blocking_pairs = 0;
        for (edge, crosses_river, crossings) in rx.iter() {
            board.edges[edge].crosses_river = crosses_river;
            for other in crossings {
                board.edges[edge].blocks.push(other);
                board.edges[other].blocks.push(edge);
                blocking_pairs += 1;
            }
        }
        drop(thread_pool);

        // Rows arrive in any order.
        for edge in board.edges.iter_mut() {
            edge.blocks.sort_unstable();
        }

        debug!(
            nodes = board.nodes.len(),
            edges = board.edges.len(),
            blocking_pairs,
            river_crossings = board.edges.iter().filter(|edge| edge.crosses_river).count(),
            "built board"
        );

        Ok(board)
    }
}
