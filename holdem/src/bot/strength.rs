//! Hand strength estimation: Chen formula preflop, Monte Carlo equity
//! once there is a board.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::cards::{Card, Rank, Suit};
use crate::eval;

/// Chen formula: approximate preflop strength of two hole cards on a
/// 0-20 scale. Higher is stronger.
#[must_use]
pub fn chen_score(hole_cards: &[Card]) -> f32 {
    let [a, b] = hole_cards else {
        return 0.0;
    };
    let (hi, lo) = if a.rank >= b.rank { (a, b) } else { (b, a) };
    let r1 = hi.rank.value();
    let r2 = lo.rank.value();
    let gap = r1 - r2;

    let mut score = match r1 {
        14 => 10.0,
        13 => 8.0,
        12 => 7.0,
        11 => 6.0,
        v => f32::from(v) / 2.0,
    };

    if r1 == r2 {
        return (score * 2.0).max(5.0);
    }

    if hi.suit == lo.suit {
        score += 2.0;
    }
    score += match gap {
        0 | 1 => 0.0,
        2 => -1.0,
        3 => -2.0,
        4 => -4.0,
        _ => -5.0,
    };
    // Connectors below queen-high keep straight potential.
    if gap <= 1 && r1 <= 11 {
        score += 1.0;
    }
    score.max(0.0)
}

/// Chen score normalized to [0, 1].
#[must_use]
pub fn preflop_equity(hole_cards: &[Card]) -> f32 {
    (chen_score(hole_cards) / 20.0).min(1.0)
}

/// Estimate win equity against `num_opponents` random hands. Ties
/// count half. Returns a probability in [0, 1].
pub fn monte_carlo_equity(
    hole_cards: &[Card],
    community_cards: &[Card],
    num_opponents: usize,
    simulations: u32,
    rng: &mut impl Rng,
) -> f32 {
    let num_opponents = num_opponents.max(1);
    let mut deck: Vec<Card> = Suit::ALL
        .into_iter()
        .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
        .filter(|c| !hole_cards.contains(c) && !community_cards.contains(c))
        .collect();

    let board_needed = 5 - community_cards.len();
    let mut wins = 0.0f32;

    for _ in 0..simulations {
        deck.shuffle(rng);
        let mut next = 0;

        let mut board = community_cards.to_vec();
        board.extend_from_slice(&deck[next..next + board_needed]);
        next += board_needed;

        let mut ours: Vec<Card> = hole_cards.to_vec();
        ours.extend_from_slice(&board);
        let our_score = eval::eval_best(&ours);

        let mut best_opponent = eval::Score::MAX;
        for _ in 0..num_opponents {
            let mut theirs = vec![deck[next], deck[next + 1]];
            next += 2;
            theirs.extend_from_slice(&board);
            best_opponent = best_opponent.min(eval::eval_best(&theirs));
        }

        if our_score < best_opponent {
            wins += 1.0;
        } else if our_score == best_opponent {
            wins += 0.5;
        }
    }
    wins / simulations as f32
}
