//! Property-based and exhaustive checks for the hand evaluator.

use proptest::prelude::*;
use std::collections::HashSet;

use holdem::cards::{Card, Rank, Suit};
use holdem::eval;

fn card_from_index(i: usize) -> Card {
    Card::new(Rank::ALL[i % 13], Suit::ALL[i / 13])
}

fn five_distinct() -> impl Strategy<Value = [Card; 5]> {
    prop::collection::hash_set(0..52usize, 5).prop_map(|set| {
        let v: Vec<Card> = set.into_iter().map(card_from_index).collect();
        [v[0], v[1], v[2], v[3], v[4]]
    })
}

fn seven_distinct() -> impl Strategy<Value = [Card; 7]> {
    prop::collection::hash_set(0..52usize, 7).prop_map(|set| {
        let v: Vec<Card> = set.into_iter().map(card_from_index).collect();
        [v[0], v[1], v[2], v[3], v[4], v[5], v[6]]
    })
}

/// Heap's algorithm; enough to visit all 120 orderings of a hand.
fn for_each_permutation(cards: [Card; 5], visit: &mut impl FnMut([Card; 5])) {
    fn heap(k: usize, cards: &mut [Card; 5], visit: &mut impl FnMut([Card; 5])) {
        if k == 1 {
            visit(*cards);
            return;
        }
        for i in 0..k {
            heap(k - 1, cards, visit);
            if k % 2 == 0 {
                cards.swap(i, k - 1);
            } else {
                cards.swap(0, k - 1);
            }
        }
    }
    let mut cards = cards;
    heap(5, &mut cards, visit);
}

proptest! {
    #[test]
    fn eval5_is_order_independent(hand in five_distinct()) {
        let expected = eval::eval5(&hand);
        let mut checked = 0u32;
        for_each_permutation(hand, &mut |permuted| {
            assert_eq!(eval::eval5(&permuted), expected);
            checked += 1;
        });
        prop_assert_eq!(checked, 120);
    }

    #[test]
    fn eval5_scores_stay_in_range(hand in five_distinct()) {
        let score = eval::eval5(&hand);
        prop_assert!((eval::BEST_SCORE..=eval::WORST_SCORE).contains(&score));
    }

    #[test]
    fn eval7_is_the_minimum_over_all_subsets(cards in seven_distinct()) {
        let (score, best_five) = eval::eval7(&cards);

        let mut expected = u16::MAX;
        for skip_a in 0..6 {
            for skip_b in skip_a + 1..7 {
                let five: Vec<Card> = (0..7)
                    .filter(|&k| k != skip_a && k != skip_b)
                    .map(|k| cards[k])
                    .collect();
                let five: [Card; 5] = five.try_into().unwrap();
                expected = expected.min(eval::eval5(&five));
            }
        }
        prop_assert_eq!(score, expected);

        // The reported indices reproduce the winning score.
        let five = best_five.map(|i| cards[i]);
        prop_assert_eq!(eval::eval5(&five), score);
    }
}

/// k-combinations preserving input order.
fn combos(items: &[Rank], k: usize) -> Vec<Vec<Rank>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for i in 0..=items.len() - k {
        for rest in combos(&items[i + 1..], k - 1) {
            let mut combo = vec![items[i]];
            combo.extend(rest);
            out.push(combo);
        }
    }
    out
}

/// One representative hand per distinct rank: every score in
/// [1, 7462] must come out of the evaluator exactly once.
#[test]
fn test_every_score_is_reachable() {
    let ranks: Vec<Rank> = (2..=14).rev().filter_map(Rank::from_value).collect();
    let (c, d, h, s) = (Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades);
    let mut scores: HashSet<u16> = HashSet::new();

    // Five distinct ranks, suited (straight flushes and flushes) and
    // offsuit (straights and high cards).
    for combo in combos(&ranks, 5) {
        let suited: Vec<Card> = combo.iter().map(|&r| Card::new(r, c)).collect();
        scores.insert(eval::eval5(&suited.try_into().unwrap()));

        let offsuit = [
            Card::new(combo[0], h),
            Card::new(combo[1], c),
            Card::new(combo[2], c),
            Card::new(combo[3], c),
            Card::new(combo[4], c),
        ];
        scores.insert(eval::eval5(&offsuit));
    }

    // Four of a kind.
    for &quad in &ranks {
        for &kicker in ranks.iter().filter(|&&k| k != quad) {
            scores.insert(eval::eval5(&[
                Card::new(quad, c),
                Card::new(quad, d),
                Card::new(quad, h),
                Card::new(quad, s),
                Card::new(kicker, c),
            ]));
        }
    }

    // Full houses.
    for &trips in &ranks {
        for &pair in ranks.iter().filter(|&&p| p != trips) {
            scores.insert(eval::eval5(&[
                Card::new(trips, c),
                Card::new(trips, d),
                Card::new(trips, h),
                Card::new(pair, c),
                Card::new(pair, d),
            ]));
        }
    }

    // Three of a kind.
    for &trips in &ranks {
        let kickers: Vec<Rank> = ranks.iter().copied().filter(|&k| k != trips).collect();
        for combo in combos(&kickers, 2) {
            scores.insert(eval::eval5(&[
                Card::new(trips, c),
                Card::new(trips, d),
                Card::new(trips, h),
                Card::new(combo[0], c),
                Card::new(combo[1], d),
            ]));
        }
    }

    // Two pair.
    for (i, &high) in ranks.iter().enumerate() {
        for &low in &ranks[i + 1..] {
            for &kicker in ranks.iter().filter(|&&k| k != high && k != low) {
                scores.insert(eval::eval5(&[
                    Card::new(high, c),
                    Card::new(high, d),
                    Card::new(low, c),
                    Card::new(low, d),
                    Card::new(kicker, h),
                ]));
            }
        }
    }

    // One pair.
    for &pair in &ranks {
        let kickers: Vec<Rank> = ranks.iter().copied().filter(|&k| k != pair).collect();
        for combo in combos(&kickers, 3) {
            scores.insert(eval::eval5(&[
                Card::new(pair, c),
                Card::new(pair, d),
                Card::new(combo[0], c),
                Card::new(combo[1], d),
                Card::new(combo[2], h),
            ]));
        }
    }

    assert_eq!(scores.len(), 7462);
    assert_eq!(scores.iter().min(), Some(&eval::BEST_SCORE));
    assert_eq!(scores.iter().max(), Some(&eval::WORST_SCORE));
}

#[test]
fn test_anchor_hands() {
    let royal: [Card; 5] = ["Ah", "Kh", "Qh", "Jh", "Th"].map(|x| x.parse().unwrap());
    assert_eq!(eval::eval5(&royal), 1);
    assert_eq!(eval::hand_name(1), "Royal Flush");

    let seven_high: [Card; 5] = ["7d", "5c", "4h", "3s", "2d"].map(|x| x.parse().unwrap());
    assert_eq!(eval::eval5(&seven_high), 7462);
}
