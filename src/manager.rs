use crate::board::{Board, Edge, EdgeId, Node, NodeId, Track};
use crate::card::{Card, Deck};
use crate::config::Config;
use crate::error::{ConstructionError, IllegalMove, ManagerError};
use crate::london;
use crate::score::{score, ScoreSheet};
use crate::track_color::TrackColor;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use smallvec::SmallVec;
use strum::{EnumCount, IntoEnumIterator};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
/// Phases of the game, which act as states in the game's finite-state machine.
///
/// # JSON
/// Phases are serialized in snake_case.
pub enum GamePhase {
    /// No line has been drawn yet. The first draw picks the first line.
    Ready,
    /// Lines are drawn one after the other, each with a fresh deck.
    Playing,
    /// Every line is finished; only the score is left.
    Done,
}

/// What happened when a card was requested, returned by [`Manager::draw_card`].
///
/// # JSON
/// Serialized as an object tagged by `outcome`, in snake_case.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrawOutcome {
    /// The previous round ended, if any, and a new line starts from `start`.
    RoundStarted { color: TrackColor, start: NodeId },
    /// A card was drawn; `targets` are the stations it can reach, possibly none.
    Card { card: Card, targets: Vec<NodeId> },
    /// Every line is finished.
    GameEnded { scores: ScoreSheet },
}

#[derive(Serialize)]
/// All the information a renderer needs, returned by [`Manager::get_state`].
pub struct GameState<'a> {
    pub phase: GamePhase,
    pub active_color: Option<TrackColor>,
    /// Where the active line continues from.
    pub current_node: Option<NodeId>,
    /// The card that was drawn and not played yet.
    pub active_card: Option<Card>,
    /// Stations the active card can reach.
    pub targets: &'a [NodeId],
    pub red_cards_drawn: usize,
    pub cards_left: usize,
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    /// Indexed by [`TrackColor::index`].
    pub tracks: &'a [Track; TrackColor::COUNT],
}

/// In charge of a whole game: the deck, the order in which lines are drawn,
/// and the moves of the player, which it forwards to the [`Board`].
///
/// This overall acts as a finite-state machine.
pub struct Manager {
    board: Board,
    config: Config,
    rng: StdRng,
    /// The current phase of the game, which marks nodes (states) in this finite-state machine.
    phase: GamePhase,
    /// Reset at the start of every line.
    deck: Deck,
    /// Lines not drawn yet, picked at random one after the other.
    remaining_colors: SmallVec<[TrackColor; TrackColor::COUNT]>,
    active_card: Option<Card>,
    /// Cached for the active card, so that a move is checked against what was offered.
    targets: Vec<NodeId>,
}

impl Manager {
    /// Creates a new [`Manager`] in the [`GamePhase::Ready`], playing on `board`.
    pub fn new(board: Board, config: Config) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let deck = Deck::new(&mut rng);

        Self {
            board,
            config,
            rng,
            phase: GamePhase::Ready,
            deck,
            remaining_colors: TrackColor::iter().collect(),
            active_card: None,
            targets: Vec::new(),
        }
    }

    /// Creates a new [`Manager`] playing on the default London board.
    pub fn london(config: Config) -> Result<Self, ConstructionError> {
        Ok(Self::new(london::board()?, config))
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Returns the game's state, for rendering.
    pub fn get_state(&self) -> GameState {
        GameState {
            phase: self.phase,
            active_color: self.board.active_color(),
            current_node: self.board.current_node(),
            active_card: self.active_card,
            targets: &self.targets,
            red_cards_drawn: self.deck.red_cards_drawn(),
            cards_left: self.deck.remaining().len(),
            nodes: self.board.nodes(),
            edges: self.board.edges(),
            tracks: &self.board.tracks,
        }
    }

    /// The score of the board as it stands.
    pub fn scores(&self) -> ScoreSheet {
        score(&self.board)
    }

    /// Advances the game by one draw.
    ///
    /// * Before the first line, and once a round is over, the next line is picked at random
    ///   among those left. Lines without a start station are skipped.
    /// * Once every line is finished, the game ends with its score.
    /// * Otherwise, the next card is drawn, and the stations it can reach are returned.
    ///
    /// A round is over when [`Config::red_card_cap`] red cards came out of the deck,
    /// or when the deck is empty. A card not played when the next one is drawn is lost.
    ///
    /// Returns an `Err` once the game is [`GamePhase::Done`].
    pub fn draw_card(&mut self) -> Result<DrawOutcome, ManagerError> {
        let color = match (self.phase, self.board.active_color()) {
            (GamePhase::Done, _) => return Err(ManagerError::NotPlaying),
            (GamePhase::Ready, _) | (GamePhase::Playing, None) => return self.next_round(),
            (GamePhase::Playing, Some(color)) => color,
        };

        self.settle_swap(color)?;

        if self.deck.is_round_over(self.config.red_card_cap) {
            return self.next_round();
        }
        let card = match self.deck.draw() {
            Some(card) => card,
            None => return self.next_round(),
        };

        if card.is_railroad() {
            self.board.begin_swap(color)?;
        }

        let targets = self.board.legal_targets(color, Some(card));
        if targets.is_empty() {
            self.settle_swap(color)?;
        }

        debug!(
            %color,
            card = %card.kind,
            red_cards_drawn = self.deck.red_cards_drawn(),
            targets = targets.len(),
            "drew card"
        );

        self.active_card = Some(card);
        self.targets = targets.clone();
        Ok(DrawOutcome::Card { card, targets })
    }

    /// Plays the active card by claiming the track to `node`, one of the offered targets.
    ///
    /// Returns the claimed edge.
    pub fn choose_target(&mut self, node: NodeId) -> Result<EdgeId, ManagerError> {
        let color = self.active_color()?;

        if self.active_card.is_none() {
            return Err(ManagerError::NoCardDrawn);
        }
        if !self.targets.contains(&node) {
            return Err(ManagerError::IllegalTarget { node });
        }

        let edge = self.board.claim(color, node)?;
        self.active_card = None;
        self.targets.clear();

        Ok(edge)
    }

    /// After a railroad card, moves the active line to `node`, one of the stations it visited.
    ///
    /// Returns the stations the active card, if any, reaches from there.
    pub fn choose_station(&mut self, node: NodeId) -> Result<Vec<NodeId>, ManagerError> {
        let color = self.active_color()?;
        self.board.resolve_swap_from(color, node)?;

        self.targets = match self.active_card {
            Some(card) => self.board.legal_targets(color, Some(card)),
            None => Vec::new(),
        };

        Ok(self.targets.clone())
    }

    /// Starts over on the same board: every line is forgotten and the deck is reset.
    pub fn restart(&mut self) {
        self.board.restart();
        self.phase = GamePhase::Ready;
        self.deck = Deck::new(&mut self.rng);
        self.remaining_colors = TrackColor::iter().collect();
        self.active_card = None;
        self.targets.clear();

        info!("game restarted");
    }

    fn active_color(&self) -> Result<TrackColor, ManagerError> {
        match (self.phase, self.board.active_color()) {
            (GamePhase::Playing, Some(color)) => Ok(color),
            _ => Err(ManagerError::NotPlaying),
        }
    }

    /// A railroad card that was used up by a query without being resolved is given up.
    fn settle_swap(&mut self, color: TrackColor) -> Result<(), IllegalMove> {
        if !self.board.swap_resolved() && !self.board.swap_pending() {
            self.board.abandon_swap(color)?;
        }

        Ok(())
    }

    fn next_round(&mut self) -> Result<DrawOutcome, ManagerError> {
        self.phase = GamePhase::Playing;
        self.active_card = None;
        self.targets.clear();
        self.board.finish_round();

        while !self.remaining_colors.is_empty() {
            let index = self.rng.gen_range(0..self.remaining_colors.len());
            let color = self.remaining_colors.remove(index);

            self.deck = Deck::new(&mut self.rng);
            if self.config.reset_board_between_rounds {
                self.board.reset_dynamic_state();
            }

            match self.board.start_round(color) {
                Ok(start) => return Ok(DrawOutcome::RoundStarted { color, start }),
                Err(IllegalMove::NoStartNode(_)) => {
                    warn!(%color, "no start station on this board, skipping line")
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.phase = GamePhase::Done;
        let scores = self.scores();
        info!(total = scores.total(), "game over");

        Ok(DrawOutcome::GameEnded { scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::grid_board;
    use crate::board::TrackPhase;
    use crate::card::{CardColor, CardType};

    use pretty_assertions::assert_eq;

    fn manager(config: Config) -> Manager {
        Manager::new(grid_board(), config)
    }

    fn seeded(seed: u64) -> Config {
        Config {
            seed: Some(seed),
            ..Config::default()
        }
    }

    fn start(m: &mut Manager) -> (TrackColor, NodeId) {
        match m.draw_card() {
            Ok(DrawOutcome::RoundStarted { color, start }) => (color, start),
            other => panic!("expected a new round, got {:?}", other),
        }
    }

    fn blue(kind: CardType) -> Card {
        Card {
            kind,
            color: Some(CardColor::Blue),
        }
    }

    // Tests for `GamePhase`.

    #[test]
    fn game_phase_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&GamePhase::Ready)?, r#""ready""#);
        assert_eq!(serde_json::to_string(&GamePhase::Playing)?, r#""playing""#);
        assert_eq!(serde_json::to_string(&GamePhase::Done)?, r#""done""#);

        Ok(())
    }

    #[test]
    fn draw_outcome_to_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&DrawOutcome::RoundStarted {
                color: TrackColor::Purple,
                start: 21
            })?,
            r#"{"outcome":"round_started","color":"purple","start":21}"#
        );
        Ok(())
    }

    // Tests for `Manager`.

    #[test]
    fn manager_new() {
        let m = manager(seeded(1));

        assert_eq!(m.phase, GamePhase::Ready);
        assert!(m.active_card.is_none());
        assert!(m.targets.is_empty());
        assert_eq!(m.remaining_colors.len(), TrackColor::COUNT);
        assert_eq!(m.board().active_color(), None);
    }

    #[test]
    fn first_draw_starts_a_line() {
        let mut m = manager(seeded(2));
        let (color, start) = start(&mut m);

        assert!(color == TrackColor::Red || color == TrackColor::Blue);
        assert_eq!(m.board().start_node(color), Some(start));
        assert_eq!(m.phase(), GamePhase::Playing);
    }

    #[test]
    fn lines_without_start_station_are_skipped() {
        let mut m = manager(seeded(3));
        let mut rounds = Vec::new();

        loop {
            match m.draw_card().unwrap() {
                DrawOutcome::RoundStarted { color, .. } => rounds.push(color),
                DrawOutcome::Card { .. } => {}
                DrawOutcome::GameEnded { .. } => break,
            }
        }

        rounds.sort();
        assert_eq!(rounds, vec![TrackColor::Red, TrackColor::Blue]);
        assert_eq!(m.phase(), GamePhase::Done);
        assert_eq!(m.board().phase(TrackColor::Green), TrackPhase::Unstarted);
        assert_eq!(m.draw_card(), Err(ManagerError::NotPlaying));
    }

    #[test]
    fn round_ends_at_red_card_cap() {
        for cap in [1, 3, 5] {
            let mut m = manager(Config {
                red_card_cap: cap,
                ..seeded(4)
            });
            start(&mut m);

            let mut red_cards = 0;
            let mut cards = 0;
            while let DrawOutcome::Card { card, .. } = m.draw_card().unwrap() {
                cards += 1;
                if card.is_red() {
                    red_cards += 1;
                }
            }

            assert_eq!(red_cards, cap);
            assert!(cards >= cap && cards <= crate::card::DECK_SIZE);
        }
    }

    #[test]
    fn choose_target_before_playing() {
        let mut m = manager(seeded(5));
        assert_eq!(m.choose_target(0), Err(ManagerError::NotPlaying));

        start(&mut m);
        assert_eq!(m.choose_target(0), Err(ManagerError::NoCardDrawn));
    }

    #[test]
    fn choose_target_outside_offered_targets() {
        let mut m = manager(seeded(6));
        let (color, _) = start(&mut m);
        m.deck = Deck::stacked(vec![blue(CardType::Square)]);

        m.draw_card().unwrap();
        let before = m.board().edges().to_vec();

        // The start station can never be a target of its own line.
        let start = m.board().start_node(color).unwrap();
        assert_eq!(
            m.choose_target(start),
            Err(ManagerError::IllegalTarget { node: start })
        );
        assert_eq!(m.board().edges(), &before[..]);
    }

    #[test]
    fn choose_target_claims_and_spends_the_card() {
        let mut m = manager(seeded(7));
        let (color, start) = start(&mut m);
        m.deck = Deck::stacked(vec![blue(CardType::Random)]);

        let targets = match m.draw_card().unwrap() {
            DrawOutcome::Card { targets, .. } => targets,
            other => panic!("expected a card, got {:?}", other),
        };
        assert!(!targets.is_empty());

        let edge = m.choose_target(targets[0]).unwrap();
        assert_eq!(m.board().edge_between(start, targets[0]), Some(edge));
        assert_eq!(m.board().edges()[edge].owner(), Some(color));
        assert_eq!(m.choose_target(targets[0]), Err(ManagerError::NoCardDrawn));
    }

    #[test]
    fn railroad_station_choice() {
        let mut m = manager(seeded(8));
        let (color, start) = start(&mut m);
        m.deck = Deck::stacked(vec![
            blue(CardType::Circle),
            Card {
                kind: CardType::Railroad,
                color: None,
            },
        ]);

        match m.draw_card().unwrap() {
            // Both start stations are next to the wildcard station 4 only.
            DrawOutcome::Card { card, targets } => {
                assert!(card.is_railroad());
                assert_eq!(targets, vec![4]);
            }
            other => panic!("expected the railroad card, got {:?}", other),
        }
        assert_eq!(m.board().phase(color), TrackPhase::AwaitingSwap);

        assert_eq!(m.choose_station(start), Ok(vec![4]));
        assert_eq!(m.board().phase(color), TrackPhase::Active);
        assert_eq!(
            m.choose_station(start),
            Err(ManagerError::Move(IllegalMove::NoSwapPending))
        );
    }

    #[test]
    fn unused_railroad_card_is_given_up() {
        let mut m = manager(seeded(9));
        let (color, _) = start(&mut m);
        m.deck = Deck::stacked(vec![
            blue(CardType::Square),
            blue(CardType::Random),
            Card {
                kind: CardType::Railroad,
                color: None,
            },
        ]);

        m.draw_card().unwrap();
        assert!(m.board().swap_pending());

        // The wildcard uses up the railroad card, which is left unresolved.
        m.draw_card().unwrap();
        assert!(!m.board().swap_pending());
        assert_eq!(m.board().phase(color), TrackPhase::AwaitingSwap);

        m.draw_card().unwrap();
        assert_eq!(m.board().phase(color), TrackPhase::Active);
        assert!(m.board().swap_resolved());
    }

    /// Plays a single track of the first line, then draws until the second line starts.
    fn play_one_track_then_switch(m: &mut Manager) -> (TrackColor, TrackColor) {
        let (first, _) = start(m);
        m.deck = Deck::stacked(vec![blue(CardType::Random)]);

        let targets = match m.draw_card().unwrap() {
            DrawOutcome::Card { targets, .. } => targets,
            other => panic!("expected a card, got {:?}", other),
        };
        m.choose_target(targets[0]).unwrap();
        assert!(m.board().edges().iter().any(|edge| edge.is_blocked()));

        // The stacked deck is now empty.
        let (second, _) = start(m);
        assert_ne!(first, second);

        (first, second)
    }

    #[test]
    fn board_reset_between_rounds() {
        let mut m = manager(Config {
            reset_board_between_rounds: true,
            ..seeded(13)
        });
        let (first, _) = play_one_track_then_switch(&mut m);

        assert!(m
            .board()
            .edges()
            .iter()
            .all(|edge| !edge.is_blocked() && edge.owner().is_none()));
        assert_eq!(m.board().phase(first), TrackPhase::Finished);
        assert_eq!(m.board().track(first).visited().len(), 2);
        assert_eq!(m.board().track(first).claimed().len(), 1);
    }

    #[test]
    fn board_kept_between_rounds_by_default() {
        let mut m = manager(seeded(13));
        let (first, _) = play_one_track_then_switch(&mut m);

        let claimed = m.board().track(first).claimed()[0];
        assert!(m.board().edges()[claimed].is_blocked());
        assert_eq!(m.board().edges()[claimed].owner(), Some(first));
    }

    #[test]
    fn restart_forgets_everything() {
        let mut m = manager(seeded(10));
        start(&mut m);
        m.draw_card().unwrap();

        m.restart();
        assert_eq!(m.phase(), GamePhase::Ready);
        assert!(m.active_card.is_none());
        assert_eq!(m.remaining_colors.len(), TrackColor::COUNT);
        assert_eq!(m.deck.remaining().len(), crate::card::DECK_SIZE);
        assert_eq!(m.board().active_color(), None);
        assert!(TrackColor::iter().all(|color| m.board().track(color).visited().is_empty()));
    }

    #[test]
    fn same_seed_same_game() {
        let play = |seed| {
            let mut m = manager(seeded(seed));
            let mut outcomes = Vec::new();

            loop {
                let outcome = m.draw_card().unwrap();
                if let DrawOutcome::Card { targets, .. } = &outcome {
                    if let Some(&target) = targets.first() {
                        m.choose_target(target).unwrap();
                    }
                }
                let ended = matches!(outcome, DrawOutcome::GameEnded { .. });
                outcomes.push(outcome);
                if ended {
                    return outcomes;
                }
            }
        };

        assert_eq!(play(11), play(11));
    }

    #[test]
    fn state_to_json() -> serde_json::Result<()> {
        let mut m = manager(seeded(12));
        start(&mut m);

        let state = serde_json::to_value(m.get_state())?;
        assert_eq!(state["phase"], "playing");
        assert_eq!(state["nodes"].as_array().map(Vec::len), Some(9));
        assert_eq!(state["cards_left"], crate::card::DECK_SIZE);
        assert_eq!(state["tracks"].as_array().map(Vec::len), Some(TrackColor::COUNT));
        Ok(())
    }
}
