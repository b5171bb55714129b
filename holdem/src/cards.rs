//! Cards, ranks, suits, and the shuffled deck.
//!
//! Every card carries a 32-bit encoding used by the evaluator:
//!
//! ```text
//! +--------+--------+--------+--------+
//! |xxxbbbbb|bbbbbbbb|cdhsrrrr|xxpppppp|
//! +--------+--------+--------+--------+
//! b = one-hot rank bit (bit 16 + rank index)
//! cdhs = suit flags (bits 12-15)
//! rrrr = rank index nibble (bits 8-11)
//! p = prime assigned to the rank (bits 0-5)
//! ```

use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Primes assigned to each rank, deuce through ace.
const RANK_PRIMES: [u32; 13] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value, 2-14 (ace high).
    #[must_use]
    pub fn value(self) -> u8 {
        self.index() as u8 + 2
    }

    /// Zero-based index, deuce = 0 through ace = 12.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn prime(self) -> u32 {
        RANK_PRIMES[self.index()]
    }

    #[must_use]
    pub fn from_value(value: u8) -> Option<Self> {
        if (2..=14).contains(&value) {
            Some(Self::ALL[value as usize - 2])
        } else {
            None
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    /// Suit flag in the encoded card (bits 12-15).
    #[must_use]
    pub fn flag(self) -> u32 {
        match self {
            Suit::Clubs => 0x8000,
            Suit::Diamonds => 0x4000,
            Suit::Hearts => 0x2000,
            Suit::Spades => 0x1000,
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Sentinel shown in place of an opponent's hole card.
pub const HIDDEN_CARD: &str = "??";

/// A playing card. Immutable value object; the two-character string
/// form (`Qh`, `Ts`) is the wire format.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// The 32-bit evaluator encoding described in the module docs.
    #[must_use]
    pub fn encode(self) -> u32 {
        let rank_bit = 1u32 << (16 + self.rank.index());
        let rank_nibble = (self.rank.index() as u32) << 8;
        rank_bit | self.suit.flag() | rank_nibble | self.rank.prime()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseCardError {
    #[error("card must be two characters, got {0:?}")]
    Length(String),
    #[error("unknown rank {0:?}")]
    Rank(char),
    #[error("unknown suit {0:?}")]
    Suit(char),
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(u), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCardError::Length(s.to_string()));
        };
        let rank = Rank::ALL
            .into_iter()
            .find(|rank| rank.symbol() == r.to_ascii_uppercase())
            .ok_or(ParseCardError::Rank(r))?;
        let suit = Suit::ALL
            .into_iter()
            .find(|suit| suit.symbol() == u.to_ascii_lowercase())
            .ok_or(ParseCardError::Suit(u))?;
        Ok(Card::new(rank, suit))
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An ordered 52-card deck, shuffled once at hand start and dealt from
/// the top. Never reshuffled mid-hand.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    #[must_use]
    pub fn new_shuffled() -> Self {
        let mut cards: Vec<Card> = Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
            .collect();
        cards.shuffle(&mut rand::rng());
        Self { cards, next: 0 }
    }

    /// A deck that deals the given cards in order. Deterministic deals
    /// for replays and tests.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards, next: 0 }
    }

    /// Draw the top card. Panics when the deck is exhausted; a full
    /// ring only ever consumes 23 of the 52 cards.
    pub fn deal(&mut self) -> Card {
        let card = self.cards[self.next];
        self.next += 1;
        card
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_52_distinct_cards() {
        let mut deck = Deck::new_shuffled();
        let mut seen = HashSet::new();
        for _ in 0..52 {
            seen.insert(deck.deal());
        }
        assert_eq!(seen.len(), 52);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_encoding_king_of_diamonds() {
        // The canonical worked example of the encoding.
        let kd = Card::new(Rank::King, Suit::Diamonds);
        assert_eq!(kd.encode(), 0x0800_0000 | 0x4000 | 0x0B00 | 37);
    }

    #[test]
    fn test_encoding_views_are_consistent() {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                let bits = Card::new(rank, suit).encode();
                assert_eq!(bits >> 16, 1 << rank.index());
                assert_eq!(bits & 0xF000, suit.flag());
                assert_eq!((bits >> 8) & 0xF, rank.index() as u32);
                assert_eq!(bits & 0x3F, rank.prime());
            }
        }
    }

    #[test]
    fn test_card_string_round_trip() {
        for s in ["Qh", "Ts", "2c", "Ad", "9d"] {
            let card: Card = s.parse().unwrap();
            assert_eq!(card.to_string(), s);
        }
        assert!("10h".parse::<Card>().is_err());
        assert!("Xx".parse::<Card>().is_err());
    }

    #[test]
    fn test_card_serde_uses_string_form() {
        let card: Card = "Jd".parse().unwrap();
        assert_eq!(serde_json::to_string(&card).unwrap(), "\"Jd\"");
        let back: Card = serde_json::from_str("\"Jd\"").unwrap();
        assert_eq!(back, card);
    }
}
