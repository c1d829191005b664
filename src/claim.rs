//! The claim state machine of each line.
//!
//! ```text
//! Unstarted --start_round--> Active --claim--> Active
//!                              |  ^
//!                   begin_swap |  | claim / resolve_swap_from / abandon_swap
//!                              v  |
//!                          AwaitingSwap
//!
//! Active | AwaitingSwap --finish_round--> Finished
//! ```
//!
//! Every transition validates all of its preconditions before touching the board,
//! so a rejected move leaves the board exactly as it was.

use crate::board::{Board, EdgeId, NodeId, Track, TrackPhase};
use crate::error::IllegalMove;
use crate::track_color::TrackColor;

use array_init::array_init;
use std::sync::atomic::Ordering;
use strum::EnumCount;
use tracing::{debug, info};

impl Board {
    /// Makes `color` the line being drawn, starting from its start station.
    ///
    /// If another line was being drawn, its round is finished first.
    /// Returns the start station.
    ///
    /// # Example
    /// ```
    /// use london_system::board::TrackPhase;
    /// use london_system::london;
    /// use london_system::track_color::TrackColor;
    ///
    /// let mut board = london::board().unwrap();
    /// let start = board.start_round(TrackColor::Red).unwrap();
    ///
    /// assert_eq!(board.current_node(), Some(start));
    /// assert_eq!(board.phase(TrackColor::Red), TrackPhase::Active);
    /// assert_eq!(board.track(TrackColor::Red).visited(), &[start]);
    /// ```
    pub fn start_round(&mut self, color: TrackColor) -> Result<NodeId, IllegalMove> {
        match self.phase(color) {
            TrackPhase::Finished => return Err(IllegalMove::RoundOver(color)),
            TrackPhase::Active | TrackPhase::AwaitingSwap => {
                if let Some(cursor) = self.cursor {
                    return Ok(cursor);
                }
            }
            TrackPhase::Unstarted => {}
        }

        let start = self
            .start_node(color)
            .ok_or(IllegalMove::NoStartNode(color))?;

        self.finish_round();

        self.phases[color.index()] = TrackPhase::Active;
        self.active = Some(color);
        self.cursor = Some(start);
        self.swap_pending.store(false, Ordering::Relaxed);
        self.tracks[color.index()].visited.push(start);
        self.nodes[start].highlighted = true;

        info!(%color, start, "round started");
        Ok(start)
    }

    /// Claims the track between the current station of `color` and `target`, then moves there.
    ///
    /// The claimed track, and every track that crosses it, become blocked for all lines.
    ///
    /// While a railroad card is waiting, the move may start from any station the line has
    /// visited: the first one in visit order with an unblocked track to `target` is used.
    ///
    /// Returns the claimed edge.
    ///
    /// # Example
    /// ```
    /// use london_system::london;
    /// use london_system::track_color::TrackColor;
    ///
    /// let mut board = london::board().unwrap();
    /// let start = board.start_round(TrackColor::Red).unwrap();
    /// let target = board.legal_targets(TrackColor::Red, None)[0];
    ///
    /// let edge = board.claim(TrackColor::Red, target).unwrap();
    /// assert!(board.edge(edge).unwrap().is_blocked());
    /// assert_eq!(board.edge(edge).unwrap().owner(), Some(TrackColor::Red));
    /// assert_eq!(board.track(TrackColor::Red).visited(), &[start, target]);
    ///
    /// // The track cannot be claimed twice.
    /// assert!(board.claim(TrackColor::Red, start).is_err());
    /// ```
    pub fn claim(&mut self, color: TrackColor, target: NodeId) -> Result<EdgeId, IllegalMove> {
        let cursor = self.ensure_active(color)?;

        let edge = if self.phase(color) == TrackPhase::AwaitingSwap {
            self.find_swap_edge(color, cursor, target)?
        } else {
            self.find_unblocked_edge(cursor, target)?
        };

        if self.phase(color) == TrackPhase::AwaitingSwap {
            self.set_visited_highlight(color, false);
            self.phases[color.index()] = TrackPhase::Active;
            self.swap_pending.store(false, Ordering::Relaxed);
        }

        self.nodes[cursor].highlighted = false;

        let claimed = &mut self.edges[edge];
        claimed.blocked = true;
        claimed.owner = Some(color);
        let cascade = claimed.blocks.clone();

        let track = &mut self.tracks[color.index()];
        track.claimed.push(edge);
        track.visited.push(target);

        for &other in &cascade {
            self.edges[other].blocked = true;
        }

        self.cursor = Some(target);
        self.nodes[target].highlighted = true;

        debug!(%color, edge, target, cascade = cascade.len(), "claimed track");
        Ok(edge)
    }

    /// Records that a railroad card was drawn for `color`.
    ///
    /// Every visited station is highlighted, and the next legal-move query with a
    /// non-railroad card starts from all of them.
    pub fn begin_swap(&mut self, color: TrackColor) -> Result<(), IllegalMove> {
        self.ensure_active(color)?;

        self.phases[color.index()] = TrackPhase::AwaitingSwap;
        self.swap_pending.store(true, Ordering::Relaxed);
        self.set_visited_highlight(color, true);

        debug!(%color, "railroad swap pending");
        Ok(())
    }

    /// Resolves a pending railroad card by moving the line's current station to `node`,
    /// one of the stations it already visited.
    pub fn resolve_swap_from(&mut self, color: TrackColor, node: NodeId) -> Result<(), IllegalMove> {
        self.ensure_active(color)?;

        if self.phase(color) != TrackPhase::AwaitingSwap {
            return Err(IllegalMove::NoSwapPending);
        }
        if !self.track(color).visited().contains(&node) {
            return Err(IllegalMove::NotVisited { node });
        }

        self.set_visited_highlight(color, false);
        self.phases[color.index()] = TrackPhase::Active;
        self.swap_pending.store(false, Ordering::Relaxed);
        self.cursor = Some(node);
        self.nodes[node].highlighted = true;

        debug!(%color, node, "railroad swap resolved");
        Ok(())
    }

    /// Gives up on a pending railroad card: the line continues from its current station.
    pub fn abandon_swap(&mut self, color: TrackColor) -> Result<(), IllegalMove> {
        let cursor = self.ensure_active(color)?;

        if self.phase(color) != TrackPhase::AwaitingSwap {
            return Err(IllegalMove::NoSwapPending);
        }

        self.set_visited_highlight(color, false);
        self.phases[color.index()] = TrackPhase::Active;
        self.swap_pending.store(false, Ordering::Relaxed);
        self.nodes[cursor].highlighted = true;

        debug!(%color, "railroad swap abandoned");
        Ok(())
    }

    /// Ends the round of the line being drawn, if any. That line accepts no further claim
    /// this game. Returns the finished line.
    pub fn finish_round(&mut self) -> Option<TrackColor> {
        let color = self.active.take()?;

        self.phases[color.index()] = TrackPhase::Finished;
        self.cursor = None;
        self.swap_pending.store(false, Ordering::Relaxed);
        for node in self.nodes.iter_mut() {
            node.highlighted = false;
        }

        info!(
            %color,
            claimed = self.track(color).claimed().len(),
            "round finished"
        );
        Some(color)
    }

    /// Unblocks every track and clears ownership and highlights.
    /// The records of each line are kept.
    pub fn reset_dynamic_state(&mut self) {
        for edge in self.edges.iter_mut() {
            edge.blocked = false;
            edge.owner = None;
            edge.highlighted = false;
        }
        for node in self.nodes.iter_mut() {
            node.highlighted = false;
        }
        if let Some(cursor) = self.cursor {
            self.nodes[cursor].highlighted = true;
        }
    }

    /// Brings the board back to its freshly built state, forgetting every line.
    pub fn restart(&mut self) {
        self.active = None;
        self.cursor = None;
        self.swap_pending.store(false, Ordering::Relaxed);
        self.tracks = array_init(|_| Track::default());
        self.phases = [TrackPhase::Unstarted; TrackColor::COUNT];
        self.reset_dynamic_state();

        info!("board restarted");
    }

    /// Checks that `color` is the line being drawn, and returns its current station.
    fn ensure_active(&self, color: TrackColor) -> Result<NodeId, IllegalMove> {
        if self.phase(color) == TrackPhase::Finished {
            return Err(IllegalMove::RoundOver(color));
        }

        match (self.active, self.cursor) {
            (Some(active), Some(cursor)) if active == color => Ok(cursor),
            _ => Err(IllegalMove::ColorNotActive(color)),
        }
    }

    fn find_unblocked_edge(&self, from: NodeId, to: NodeId) -> Result<EdgeId, IllegalMove> {
        let edge = self
            .edge_between(from, to)
            .ok_or(IllegalMove::NoSuchEdge { from, to })?;

        if self.edges[edge].is_blocked() {
            return Err(IllegalMove::EdgeAlreadyBlocked { edge });
        }

        Ok(edge)
    }

    /// The first visited station, in visit order, with an unblocked track to `target` wins.
    fn find_swap_edge(
        &self,
        color: TrackColor,
        cursor: NodeId,
        target: NodeId,
    ) -> Result<EdgeId, IllegalMove> {
        let mut first_blocked = None;

        for &origin in self.track(color).visited() {
            match self.find_unblocked_edge(origin, target) {
                Ok(edge) => return Ok(edge),
                Err(IllegalMove::EdgeAlreadyBlocked { edge }) => {
                    first_blocked.get_or_insert(edge);
                }
                Err(_) => {}
            }
        }

        Err(match first_blocked {
            Some(edge) => IllegalMove::EdgeAlreadyBlocked { edge },
            None => IllegalMove::NoSuchEdge {
                from: cursor,
                to: target,
            },
        })
    }

    fn set_visited_highlight(&mut self, color: TrackColor, highlighted: bool) {
        for &node in self.tracks[color.index()].visited.iter() {
            self.nodes[node].highlighted = highlighted;
        }
    }
}
