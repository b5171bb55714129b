//! Seven-card hand evaluation over precomputed lookup tables.
//!
//! Scores run 1 (royal flush) to 7462 (7-high); lower is better.
//!
//! Score ranges:
//!
//! ```text
//! 1-10      straight flush
//! 11-166    four of a kind
//! 167-322   full house
//! 323-1599  flush
//! 1600-1609 straight
//! 1610-2467 three of a kind
//! 2468-3325 two pair
//! 3326-6185 one pair
//! 6186-7462 high card
//! ```
//!
//! The tables are process-wide immutable state; [`init`] forces them
//! before the first hand so no table is built inside a hot path. A
//! missing table entry is a programmer error and panics.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::cards::{Card, Rank};

pub type Score = u16;

pub const BEST_SCORE: Score = 1;
pub const WORST_SCORE: Score = 7462;

/// The ten straights, best to worst, ending with the wheel.
const STRAIGHTS: [[u8; 5]; 10] = [
    [14, 13, 12, 11, 10],
    [13, 12, 11, 10, 9],
    [12, 11, 10, 9, 8],
    [11, 10, 9, 8, 7],
    [10, 9, 8, 7, 6],
    [9, 8, 7, 6, 5],
    [8, 7, 6, 5, 4],
    [7, 6, 5, 4, 3],
    [6, 5, 4, 3, 2],
    [5, 4, 3, 2, 14],
];

struct Tables {
    /// 13-bit rank mask of a suited hand -> score. Zero means absent.
    flush: Vec<Score>,
    /// Prime product -> score, for hands with five distinct ranks.
    unique5: HashMap<u32, Score>,
    /// Prime product -> score, for hands containing duplicates.
    paired: HashMap<u32, Score>,
}

static TABLES: LazyLock<Tables> = LazyLock::new(Tables::build);

/// Force table construction. Called once at startup so the first
/// showdown does not pay the build cost.
pub fn init() {
    LazyLock::force(&TABLES);
}

fn rank_mask(ranks: &[u8]) -> usize {
    ranks.iter().fold(0, |mask, &r| mask | 1 << (r - 2))
}

fn prime_product(ranks: &[u8]) -> u32 {
    ranks
        .iter()
        .map(|&r| Rank::from_value(r).expect("rank in 2..=14").prime())
        .product()
}

/// All k-combinations of `items`, preserving input order.
fn combinations(items: &[u8], k: usize) -> Vec<Vec<u8>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for i in 0..=items.len() - k {
        for rest in combinations(&items[i + 1..], k - 1) {
            let mut combo = Vec::with_capacity(k);
            combo.push(items[i]);
            combo.extend(rest);
            out.push(combo);
        }
    }
    out
}

impl Tables {
    /// Enumerate all 7462 distinct five-card hands from best to worst,
    /// assigning consecutive scores.
    fn build() -> Self {
        let mut flush: Vec<Score> = vec![0; 1 << 13];
        let mut unique5 = HashMap::new();
        let mut paired = HashMap::new();
        let mut score: Score = 1;

        let desc: Vec<u8> = (2..=14).rev().collect();

        // Straight flushes.
        for hand in STRAIGHTS {
            flush[rank_mask(&hand)] = score;
            score += 1;
        }

        // Four of a kind, then full houses.
        for &quad in &desc {
            for &kicker in desc.iter().filter(|&&k| k != quad) {
                paired.insert(prime_product(&[quad, quad, quad, quad, kicker]), score);
                score += 1;
            }
        }
        for &trips in &desc {
            for &pair in desc.iter().filter(|&&p| p != trips) {
                paired.insert(prime_product(&[trips, trips, trips, pair, pair]), score);
                score += 1;
            }
        }

        // Every five-distinct-rank combination that is not a straight,
        // best to worst. Used twice: suited (flush) and offsuit (high card).
        let straight_masks: Vec<usize> = STRAIGHTS.iter().map(|s| rank_mask(s)).collect();
        let no_straights: Vec<Vec<u8>> = combinations(&desc, 5)
            .into_iter()
            .filter(|c| !straight_masks.contains(&rank_mask(c)))
            .collect();

        for hand in &no_straights {
            flush[rank_mask(hand)] = score;
            score += 1;
        }
        for hand in STRAIGHTS {
            unique5.insert(prime_product(&hand), score);
            score += 1;
        }

        // Three of a kind, two pair, one pair.
        for &trips in &desc {
            let kickers: Vec<u8> = desc.iter().copied().filter(|&k| k != trips).collect();
            for combo in combinations(&kickers, 2) {
                paired.insert(
                    prime_product(&[trips, trips, trips, combo[0], combo[1]]),
                    score,
                );
                score += 1;
            }
        }
        for (i, &high) in desc.iter().enumerate() {
            for &low in &desc[i + 1..] {
                for &kicker in desc.iter().filter(|&&k| k != high && k != low) {
                    paired.insert(prime_product(&[high, high, low, low, kicker]), score);
                    score += 1;
                }
            }
        }
        for &pair in &desc {
            let kickers: Vec<u8> = desc.iter().copied().filter(|&k| k != pair).collect();
            for combo in combinations(&kickers, 3) {
                paired.insert(
                    prime_product(&[pair, pair, combo[0], combo[1], combo[2]]),
                    score,
                );
                score += 1;
            }
        }

        // High cards reuse the non-straight combinations.
        for hand in &no_straights {
            unique5.insert(prime_product(hand), score);
            score += 1;
        }

        assert_eq!(score - 1, WORST_SCORE, "hand enumeration must cover 7462 ranks");

        Self {
            flush,
            unique5,
            paired,
        }
    }
}

fn eval5_encoded(c: [u32; 5]) -> Score {
    let tables = &*TABLES;
    if c[0] & c[1] & c[2] & c[3] & c[4] & 0xF000 != 0 {
        let mask = ((c[0] | c[1] | c[2] | c[3] | c[4]) >> 16) as usize & 0x1FFF;
        let score = tables.flush[mask];
        assert_ne!(score, 0, "no flush entry for rank mask {mask:#x}");
        return score;
    }
    let product = (c[0] & 0x3F) * (c[1] & 0x3F) * (c[2] & 0x3F) * (c[3] & 0x3F) * (c[4] & 0x3F);
    if let Some(&score) = tables.unique5.get(&product) {
        score
    } else {
        *tables
            .paired
            .get(&product)
            .unwrap_or_else(|| panic!("no table entry for prime product {product}"))
    }
}

/// Score a five-card hand.
#[must_use]
pub fn eval5(cards: &[Card; 5]) -> Score {
    eval5_encoded(cards.map(Card::encode))
}

/// Score the best five of seven cards, returning the winning score and
/// the indices of the five cards that make it (for showdown display).
/// Ties between equal-scoring subsets break deterministically on score
/// alone, keeping the first subset found.
#[must_use]
pub fn eval7(cards: &[Card; 7]) -> (Score, [usize; 5]) {
    let encoded = cards.map(Card::encode);
    let mut best = (Score::MAX, [0usize; 5]);
    for skip_a in 0..6 {
        for skip_b in skip_a + 1..7 {
            let mut idx = [0usize; 5];
            let mut n = 0;
            for k in 0..7 {
                if k != skip_a && k != skip_b {
                    idx[n] = k;
                    n += 1;
                }
            }
            let score = eval5_encoded([
                encoded[idx[0]],
                encoded[idx[1]],
                encoded[idx[2]],
                encoded[idx[3]],
                encoded[idx[4]],
            ]);
            if score < best.0 {
                best = (score, idx);
            }
        }
    }
    best
}

/// Score the best five-card hand from five to seven cards.
///
/// # Panics
///
/// Panics outside the 5..=7 range; callers control the card count.
#[must_use]
pub fn eval_best(cards: &[Card]) -> Score {
    match cards.len() {
        5 => eval5(cards.try_into().expect("checked length")),
        6 => {
            let mut best = Score::MAX;
            for skip in 0..6 {
                let mut five = [cards[0]; 5];
                let mut n = 0;
                for (i, &card) in cards.iter().enumerate() {
                    if i != skip {
                        five[n] = card;
                        n += 1;
                    }
                }
                best = best.min(eval5(&five));
            }
            best
        }
        7 => eval7(cards.try_into().expect("checked length")).0,
        n => panic!("eval_best requires 5-7 cards, got {n}"),
    }
}

/// Hand classes, best to worst.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandClass {
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    OnePair,
    HighCard,
}

#[must_use]
pub fn hand_class(score: Score) -> HandClass {
    match score {
        1..=10 => HandClass::StraightFlush,
        11..=166 => HandClass::FourOfAKind,
        167..=322 => HandClass::FullHouse,
        323..=1599 => HandClass::Flush,
        1600..=1609 => HandClass::Straight,
        1610..=2467 => HandClass::ThreeOfAKind,
        2468..=3325 => HandClass::TwoPair,
        3326..=6185 => HandClass::OnePair,
        _ => HandClass::HighCard,
    }
}

/// Human-readable name for a score, as shown in winner events.
#[must_use]
pub fn hand_name(score: Score) -> &'static str {
    if score == BEST_SCORE {
        return "Royal Flush";
    }
    match hand_class(score) {
        HandClass::StraightFlush => "Straight Flush",
        HandClass::FourOfAKind => "Four of a Kind",
        HandClass::FullHouse => "Full House",
        HandClass::Flush => "Flush",
        HandClass::Straight => "Straight",
        HandClass::ThreeOfAKind => "Three of a Kind",
        HandClass::TwoPair => "Two Pair",
        HandClass::OnePair => "One Pair",
        HandClass::HighCard => "High Card",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(cards: [&str; 5]) -> [Card; 5] {
        cards.map(|s| s.parse().unwrap())
    }

    #[test]
    fn test_table_sizes() {
        init();
        let tables = &*TABLES;
        assert_eq!(tables.flush.iter().filter(|&&s| s != 0).count(), 1287);
        assert_eq!(tables.unique5.len(), 1287);
        assert_eq!(tables.paired.len(), 4888);
    }

    #[test]
    fn test_royal_flush_is_best() {
        assert_eq!(eval5(&hand(["Ah", "Kh", "Qh", "Jh", "Th"])), BEST_SCORE);
        assert_eq!(hand_name(BEST_SCORE), "Royal Flush");
    }

    #[test]
    fn test_seven_high_is_worst() {
        assert_eq!(eval5(&hand(["7d", "5c", "4h", "3s", "2d"])), WORST_SCORE);
        assert_eq!(hand_name(WORST_SCORE), "High Card");
    }

    #[test]
    fn test_wheel_straight_flush() {
        // A-2-3-4-5 suited is the worst straight flush.
        assert_eq!(eval5(&hand(["5s", "4s", "3s", "2s", "As"])), 10);
    }

    #[test]
    fn test_wheel_straight_sits_below_six_high() {
        let wheel = eval5(&hand(["5s", "4h", "3d", "2c", "Ad"]));
        let six_high = eval5(&hand(["6s", "5h", "4d", "3c", "2d"]));
        assert_eq!(wheel, 1609);
        assert_eq!(six_high, 1608);
        assert!(six_high < wheel);
    }

    #[test]
    fn test_class_boundaries() {
        // Quad aces with a king kicker is the best four of a kind.
        assert_eq!(eval5(&hand(["Ah", "Ad", "Ac", "As", "Kd"])), 11);
        // Aces full of kings is the best full house.
        assert_eq!(eval5(&hand(["Ah", "Ad", "Ac", "Ks", "Kd"])), 167);
        // Broadway offsuit is the best plain straight.
        assert_eq!(eval5(&hand(["Ah", "Kd", "Qc", "Js", "Td"])), 1600);
    }

    #[test]
    fn test_kickers_order_within_pairs() {
        let aces_king = eval5(&hand(["Ah", "Ad", "Kc", "Qs", "Jd"]));
        let aces_queen = eval5(&hand(["Ah", "Ad", "Qc", "Js", "9d"]));
        let kings = eval5(&hand(["Kh", "Kd", "Ac", "Qs", "Jd"]));
        assert!(aces_king < aces_queen);
        assert!(aces_queen < kings);
    }

    #[test]
    fn test_eval7_finds_the_buried_flush() {
        let cards: [Card; 7] = ["2h", "9h", "Ah", "4c", "Kh", "8s", "3h"].map(|s| s.parse().unwrap());
        let (score, idx) = eval7(&cards);
        assert_eq!(hand_class(score), HandClass::Flush);
        for i in idx {
            assert_eq!(cards[i].suit, crate::cards::Suit::Hearts);
        }
    }

    #[test]
    fn test_eval_best_matches_eval7() {
        let cards: [Card; 7] = ["Ts", "Js", "Qs", "Ks", "As", "2d", "2c"].map(|s| s.parse().unwrap());
        assert_eq!(eval_best(&cards), BEST_SCORE);
        assert_eq!(eval7(&cards).0, BEST_SCORE);
    }
}
