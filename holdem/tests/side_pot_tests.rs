//! Side-pot payout properties.

use proptest::prelude::*;
use std::collections::HashMap;

use holdem::eval::Score;
use holdem::game::pot::PotManager;
use holdem::game::state::{Chips, PlayerId};

fn player_ids(n: usize) -> Vec<PlayerId> {
    (0..n).map(|i| format!("p{i}")).collect()
}

/// Contributions for 2-9 players, a nonempty live subset, and a score
/// per player.
fn pot_scenario() -> impl Strategy<Value = (Vec<Chips>, Vec<bool>, Vec<Score>)> {
    (2usize..=9).prop_flat_map(|n| {
        (
            prop::collection::vec(1u32..=1000, n),
            prop::collection::vec(any::<bool>(), n).prop_filter("at least one live player", |live| {
                live.iter().any(|&l| l)
            }),
            prop::collection::vec(1u16..=7462, n),
        )
    })
}

proptest! {
    /// Every chip that went in comes back out, and only to live
    /// players.
    #[test]
    fn payouts_conserve_chips((contributions, live, scores) in pot_scenario()) {
        let ids = player_ids(contributions.len());
        let mut pot = PotManager::new();
        for (id, &amount) in ids.iter().zip(&contributions) {
            pot.add_contribution(id, amount);
        }

        let live_order: Vec<PlayerId> = ids
            .iter()
            .zip(&live)
            .filter(|&(_, &l)| l)
            .map(|(id, _)| id.clone())
            .collect();
        let score_map: HashMap<PlayerId, Score> =
            ids.iter().cloned().zip(scores.iter().copied()).collect();

        let awards = pot.compute_payouts(&live_order, &score_map);

        let paid: u64 = awards
            .iter()
            .flat_map(|a| a.winners.iter().map(|(_, amount)| u64::from(*amount)))
            .sum();
        prop_assert_eq!(paid, u64::from(pot.total()));

        for award in &awards {
            prop_assert_eq!(
                award.amount,
                award.winners.iter().map(|(_, amount)| amount).sum::<Chips>()
            );
            for (winner, _) in &award.winners {
                prop_assert!(live_order.contains(winner), "folded player {} was paid", winner);
                prop_assert!(award.eligible.contains(winner));
            }
        }
    }

    /// Deeper levels are contested by ever-smaller subsets: each
    /// award's eligible set contains the next one, and the first level
    /// is open to every live contributor.
    #[test]
    fn side_pot_eligibility_is_nested((contributions, live, scores) in pot_scenario()) {
        let ids = player_ids(contributions.len());
        let mut pot = PotManager::new();
        for (id, &amount) in ids.iter().zip(&contributions) {
            pot.add_contribution(id, amount);
        }
        let live_order: Vec<PlayerId> = ids
            .iter()
            .zip(&live)
            .filter(|&(_, &l)| l)
            .map(|(id, _)| id.clone())
            .collect();
        let score_map: HashMap<PlayerId, Score> =
            ids.iter().cloned().zip(scores.iter().copied()).collect();

        let awards = pot.compute_payouts(&live_order, &score_map);
        if let Some(first) = awards.first() {
            prop_assert_eq!(&first.eligible, &live_order);
        }
        for pair in awards.windows(2) {
            for player in &pair[1].eligible {
                prop_assert!(pair[0].eligible.contains(player));
            }
            prop_assert!(pair[1].eligible.len() < pair[0].eligible.len());
        }
    }
}

/// Three-way all-in at 100 vs 300 vs 300: a 300 main pot for the
/// short stack, a 400 side pot between the two deep stacks.
#[test]
fn test_layered_all_in_payouts() {
    let mut pot = PotManager::new();
    pot.add_contribution("a", 100);
    pot.add_contribution("b", 300);
    pot.add_contribution("c", 300);

    let live_order = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let scores: HashMap<PlayerId, Score> =
        [("a", 100u16), ("b", 4000), ("c", 2000)]
            .into_iter()
            .map(|(p, s)| (p.to_string(), s))
            .collect();

    let awards = pot.compute_payouts(&live_order, &scores);
    assert_eq!(awards.len(), 2);
    assert_eq!(awards[0].winners, vec![("a".to_string(), 300)]);
    assert_eq!(awards[1].winners, vec![("c".to_string(), 400)]);
}

/// A folder who bet deeper than every live stack: the overage stays in
/// the last pot rather than leaking.
#[test]
fn test_folded_overage_swept_into_final_pot() {
    let mut pot = PotManager::new();
    pot.add_contribution("folder", 500);
    pot.add_contribution("a", 100);
    pot.add_contribution("b", 100);

    let live_order = vec!["a".to_string(), "b".to_string()];
    let scores: HashMap<PlayerId, Score> = [("a", 7u16), ("b", 9)]
        .into_iter()
        .map(|(p, s)| (p.to_string(), s))
        .collect();

    let awards = pot.compute_payouts(&live_order, &scores);
    let paid: Chips = awards
        .iter()
        .flat_map(|a| a.winners.iter().map(|(_, amount)| *amount))
        .sum();
    assert_eq!(paid, 700);
    assert_eq!(awards.last().unwrap().winners[0].0, "a");
}
