use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 11;

/// Represents the shapes printed on stations, and on the cards that are drawn.
///
/// # JSON
/// Shapes are serialized in SCREAMING_SNAKE_CASE.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "lowercase")]
pub enum CardType {
    Circle,
    Triangle,
    Square,
    Pentagon,
    /// Matches any shape, both as a card and as a station.
    Random,
    /// Not a shape: lets the next move start from any station already on the track.
    Railroad,
}

impl CardType {
    /// Whether this is the wildcard shape.
    ///
    /// # Examples:
    /// ```
    /// use london_system::card::CardType;
    ///
    /// assert!(CardType::Random.is_wild());
    /// assert!(!CardType::Circle.is_wild());
    /// ```
    #[inline]
    pub fn is_wild(&self) -> bool {
        *self == CardType::Random
    }

    /// Whether a card of this type lets a track reach a station of shape `station`.
    ///
    /// The wildcard matches in both directions: a wildcard card reaches any station,
    /// and a wildcard station is reachable with any card.
    ///
    /// # Examples:
    /// ```
    /// use london_system::card::CardType;
    ///
    /// assert!(CardType::Square.reaches(CardType::Square));
    /// assert!(!CardType::Square.reaches(CardType::Circle));
    /// assert!(CardType::Random.reaches(CardType::Circle));
    /// assert!(CardType::Square.reaches(CardType::Random));
    /// ```
    #[inline]
    pub fn reaches(&self, station: CardType) -> bool {
        *self == station || self.is_wild() || station.is_wild()
    }
}

/// The color printed on a card. Only red cards count towards the end of a round.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardColor {
    Red,
    Blue,
}

/// A single card of the deck.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: CardType,
    /// The railroad card is the only card without a color.
    pub color: Option<CardColor>,
}

impl Card {
    #[inline]
    pub fn is_railroad(&self) -> bool {
        self.kind == CardType::Railroad
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.color == Some(CardColor::Red)
    }
}

/// Convenience macro to generate a card.
macro_rules! card {
    ($kind:ident) => {
        Card {
            kind: CardType::$kind,
            color: None,
        }
    };
    ($kind:ident, $color:ident) => {
        Card {
            kind: CardType::$kind,
            color: Some(CardColor::$color),
        }
    };
}

/// The shuffled pile of cards for one color round.
///
/// A deck only shrinks: drawing takes a card uniformly at random from what remains.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    red_cards_drawn: usize,
}

impl Deck {
    /// Creates a full, shuffled deck.
    ///
    /// # Example
    /// ```
    /// use london_system::card::{Deck, DECK_SIZE};
    ///
    /// let deck = Deck::new(&mut rand::thread_rng());
    /// assert_eq!(deck.remaining().len(), DECK_SIZE);
    /// ```
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = Self::generate_cards();
        cards.shuffle(rng);

        Self {
            cards,
            red_cards_drawn: 0,
        }
    }

    /// A deck drawn in the given order, last card first.
    #[cfg(test)]
    pub(crate) fn stacked(cards: Vec<Card>) -> Self {
        Self {
            cards,
            red_cards_drawn: 0,
        }
    }

    fn generate_cards() -> Vec<Card> {
        vec![
            card! {Circle, Red},
            card! {Circle, Blue},
            card! {Triangle, Red},
            card! {Triangle, Blue},
            card! {Square, Red},
            card! {Square, Blue},
            card! {Pentagon, Red},
            card! {Pentagon, Blue},
            card! {Random, Red},
            card! {Random, Blue},
            card! {Railroad},
        ]
    }

    /// Draws the top card, or `None` once the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.pop()?;
        if card.is_red() {
            self.red_cards_drawn += 1;
        }

        Some(card)
    }

    /// Whether no further card may be drawn this round: either `red_card_cap` red cards
    /// came out, or the deck is empty.
    #[inline]
    pub fn is_round_over(&self, red_card_cap: usize) -> bool {
        self.red_cards_drawn >= red_card_cap || self.cards.is_empty()
    }

    #[inline]
    pub fn red_cards_drawn(&self) -> usize {
        self.red_cards_drawn
    }

    /// Cards left to draw, the next one being last.
    #[inline]
    pub fn remaining(&self) -> &[Card] {
        &self.cards
    }
}
