//! Contribution tracking and side-pot payouts.
//!
//! The manager stores only each player's running contribution for the
//! hand; side pots are derived at payout time from the contributions
//! plus the set of players still contesting the pot.

use std::collections::{BTreeMap, HashMap};

use crate::eval::Score;

use super::state::{Chips, PlayerId};

/// One derived pot level and where it went.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PotAward {
    pub amount: Chips,
    /// Players who contested this level, in seat order left of the
    /// dealer.
    pub eligible: Vec<PlayerId>,
    /// `(player, chips)` per winner. Ties split evenly; an integer
    /// remainder goes to the first winner in seat order.
    pub winners: Vec<(PlayerId, Chips)>,
}

#[derive(Clone, Debug, Default)]
pub struct PotManager {
    contributions: BTreeMap<PlayerId, Chips>,
    total: Chips,
}

impl PotManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.contributions.clear();
        self.total = 0;
    }

    pub fn add_contribution(&mut self, player_id: &str, amount: Chips) {
        if amount == 0 {
            return;
        }
        *self.contributions.entry(player_id.to_string()).or_default() += amount;
        self.total += amount;
    }

    #[must_use]
    pub fn contribution(&self, player_id: &str) -> Chips {
        self.contributions.get(player_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> Chips {
        self.total
    }

    /// Iterate `(player, contribution)` pairs, e.g. to refund an
    /// aborted hand.
    pub fn contributions(&self) -> impl Iterator<Item = (&PlayerId, Chips)> {
        self.contributions.iter().map(|(p, &c)| (p, c))
    }

    /// Split the pot across its cap levels and pick winners per level.
    ///
    /// `live_order` lists the players still contesting the pot in seat
    /// order starting left of the dealer; `scores` maps each of them
    /// to an evaluator score (lower wins).
    ///
    /// Cap levels are the distinct contribution totals of the live
    /// players, processed ascending; folded chips fall into whichever
    /// level encompasses them and anything above the deepest live
    /// stack stays in the final level. The sum of all awards equals
    /// the sum of all contributions.
    #[must_use]
    pub fn compute_payouts(
        &self,
        live_order: &[PlayerId],
        scores: &HashMap<PlayerId, Score>,
    ) -> Vec<PotAward> {
        let mut caps: Vec<Chips> = live_order
            .iter()
            .map(|p| self.contribution(p))
            .filter(|&c| c > 0)
            .collect();
        caps.sort_unstable();
        caps.dedup();
        let Some(&top) = caps.last() else {
            return Vec::new();
        };

        let mut awards = Vec::new();
        let mut prev: Chips = 0;
        for &cap in &caps {
            let mut amount: Chips = self
                .contributions
                .values()
                .map(|&c| c.min(cap) - c.min(prev))
                .sum();
            if cap == top {
                amount += self
                    .contributions
                    .values()
                    .map(|&c| c.saturating_sub(top))
                    .sum::<Chips>();
            }
            prev = cap;
            if amount == 0 {
                continue;
            }

            let eligible: Vec<PlayerId> = live_order
                .iter()
                .filter(|p| self.contribution(p) >= cap)
                .cloned()
                .collect();
            let best = eligible
                .iter()
                .map(|p| scores[p])
                .min()
                .expect("every cap level has a live contributor");
            let tied: Vec<&PlayerId> = eligible.iter().filter(|p| scores[*p] == best).collect();
            let share = amount / tied.len() as Chips;
            let remainder = amount % tied.len() as Chips;
            let winners = tied
                .into_iter()
                .enumerate()
                .map(|(i, p)| (p.clone(), share + if i == 0 { remainder } else { 0 }))
                .collect();

            awards.push(PotAward {
                amount,
                eligible,
                winners,
            });
        }
        awards
    }
}
