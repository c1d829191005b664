use crate::board::{Board, NodeId, TrackPhase};
use crate::card::Card;
use crate::track_color::TrackColor;

use smallvec::SmallVec;
use std::sync::atomic::Ordering;
use tracing::debug;

impl Board {
    /// Stations the `color` line can reach by claiming exactly one unblocked track,
    /// given the `card` in hand.
    ///
    /// Without a card, every unblocked neighbour qualifies. With a card, a neighbour
    /// qualifies if its shape matches the card's, or if either of them is the wildcard.
    ///
    /// After a railroad card, the next query made with a non-railroad card starts from
    /// every station the line has visited rather than from the current one. That query
    /// consumes the railroad card whether or not it finds anything. It is the one query
    /// that changes the board, through an atomic flag, even though it takes `&self`.
    ///
    /// An empty result is a normal outcome: the card cannot be played.
    /// A line that is not being drawn has no targets.
    ///
    /// # Example
    /// ```
    /// use london_system::card::{Card, CardType};
    /// use london_system::london;
    /// use london_system::track_color::TrackColor;
    ///
    /// let mut board = london::board().unwrap();
    /// board.start_round(TrackColor::Green).unwrap();
    ///
    /// let card = Card { kind: CardType::Square, color: None };
    /// for target in board.legal_targets(TrackColor::Green, Some(card)) {
    ///     assert_eq!(board.node(target).unwrap().shape, CardType::Square);
    /// }
    /// ```
    pub fn legal_targets(&self, color: TrackColor, card: Option<Card>) -> Vec<NodeId> {
        let cursor = match (self.active, self.cursor) {
            (Some(active), Some(cursor)) if active == color => cursor,
            _ => return Vec::new(),
        };

        let uses_swap = card.map_or(false, |card| !card.is_railroad())
            && self.phase(color) == TrackPhase::AwaitingSwap
            && self.swap_pending.swap(false, Ordering::Relaxed);

        let origins: SmallVec<[NodeId; 16]> = if uses_swap {
            let mut origins = SmallVec::new();
            for &node in self.track(color).visited() {
                if !origins.contains(&node) {
                    origins.push(node);
                }
            }
            origins
        } else {
            smallvec![cursor]
        };

        let mut targets = Vec::new();
        for &origin in &origins {
            for target in self.reachable_from(origin, card) {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }

        debug!(
            %color,
            card = ?card.map(|card| card.kind),
            origins = origins.len(),
            targets = targets.len(),
            "resolved legal targets"
        );

        targets
    }

    /// Far ends of the unblocked tracks leaving `origin` that `card` allows, in edge order.
    fn reachable_from(
        &self,
        origin: NodeId,
        card: Option<Card>,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.incident_edges(origin)
            .iter()
            .map(move |&edge| &self.edges[edge])
            .filter(|edge| !edge.is_blocked())
            .filter_map(move |edge| edge.other_end(origin))
            .filter(move |&target| match card {
                Some(card) => card.kind.reaches(self.nodes[target].shape),
                None => true,
            })
    }
}
