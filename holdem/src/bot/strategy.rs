//! Turns an equity estimate into a betting action.

use rand::Rng;

use crate::cards::Card;
use crate::game::betting::{BettingAction, ValidActions};
use crate::game::state::Chips;

use super::BotDifficulty;
use super::strength;

/// The redacted slice of table state a bot sees when deciding: its own
/// cards, the board, and public counts. Opponent hole cards are not
/// reachable from here by construction.
#[derive(Clone, Copy, Debug)]
pub struct BotView<'a> {
    pub hole_cards: &'a [Card],
    pub community_cards: &'a [Card],
    pub pot: Chips,
    pub chips: Chips,
    pub bet: Chips,
    /// Opponents still contesting the pot.
    pub num_opponents: usize,
    pub dealer_index: usize,
    pub seat_index: usize,
    pub num_players: usize,
}

/// Stateless decision maker. The table actor owns one per bot seat and
/// calls [`BotPlayer::decide`] when the bot's delay timer fires.
#[derive(Clone, Copy, Debug)]
pub struct BotPlayer {
    pub difficulty: BotDifficulty,
}

impl BotPlayer {
    #[must_use]
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self { difficulty }
    }

    /// Pick an action. The returned amount is the total bet and only
    /// meaningful for raises.
    pub fn decide(
        &self,
        view: &BotView<'_>,
        valid: &ValidActions,
        rng: &mut impl Rng,
    ) -> (BettingAction, Chips) {
        if view.hole_cards.len() != 2 {
            return (BettingAction::Fold, 0);
        }

        let equity = self.estimate_equity(view, rng);
        let (mut action, mut amount) = match self.difficulty {
            BotDifficulty::Easy => easy(view, valid, equity, rng),
            BotDifficulty::Medium => medium(view, valid, equity, rng),
            BotDifficulty::Hard => hard(view, valid, equity, rng),
        };

        // Never wager more than the stack, and degrade a raise that no
        // longer exceeds the call into the call itself.
        if action == BettingAction::Raise {
            amount = amount.min(view.chips + view.bet);
            if amount <= valid.call_amount {
                action = BettingAction::Call;
                amount = valid.call_amount;
            }
        }
        (action, amount)
    }

    fn estimate_equity(&self, view: &BotView<'_>, rng: &mut impl Rng) -> f32 {
        if view.community_cards.is_empty() {
            return match self.difficulty {
                BotDifficulty::Easy => strength::preflop_equity(view.hole_cards) * 0.9,
                BotDifficulty::Medium => strength::preflop_equity(view.hole_cards),
                BotDifficulty::Hard => strength::monte_carlo_equity(
                    view.hole_cards,
                    view.community_cards,
                    view.num_opponents,
                    1000,
                    rng,
                ),
            };
        }
        let simulations = match self.difficulty {
            BotDifficulty::Easy => 100,
            BotDifficulty::Medium => 300,
            BotDifficulty::Hard => 1000,
        };
        strength::monte_carlo_equity(
            view.hole_cards,
            view.community_cards,
            view.num_opponents,
            simulations,
            rng,
        )
    }
}

/// Minimum equity for a break-even call.
fn pot_odds(view: &BotView<'_>, valid: &ValidActions) -> f32 {
    if valid.call_amount == 0 {
        return 0.0;
    }
    valid.call_amount as f32 / (view.pot + valid.call_amount) as f32
}

/// A raise sized as a fraction of the pot, clamped to the legal range.
fn pot_size_bet(view: &BotView<'_>, fraction: f32, valid: &ValidActions) -> Chips {
    let pot = view.pot.max(1);
    let target = valid.call_amount + (pot as f32 * fraction) as Chips;
    target.max(valid.min_raise).min(valid.max_raise)
}

/// Seats in the back half of the order act with more information.
fn in_position(view: &BotView<'_>) -> bool {
    if view.num_players == 0 {
        return false;
    }
    let relative = (view.seat_index + view.num_players - view.dealer_index) % view.num_players;
    relative >= view.num_players / 2
}

fn easy(
    view: &BotView<'_>,
    valid: &ValidActions,
    equity: f32,
    rng: &mut impl Rng,
) -> (BettingAction, Chips) {
    if valid.can_check {
        if equity > 0.7 && valid.can_raise && rng.random_bool(0.3) {
            return (BettingAction::Raise, pot_size_bet(view, 0.5, valid));
        }
        return (BettingAction::Check, 0);
    }

    let odds = pot_odds(view, valid);
    if equity < 0.35 || (equity < odds && rng.random_bool(0.8)) {
        return (BettingAction::Fold, 0);
    }
    if equity > 0.7 && valid.can_raise && rng.random_bool(0.2) {
        return (BettingAction::Raise, pot_size_bet(view, 0.5, valid));
    }
    (BettingAction::Call, valid.call_amount)
}

fn medium(
    view: &BotView<'_>,
    valid: &ValidActions,
    equity: f32,
    rng: &mut impl Rng,
) -> (BettingAction, Chips) {
    let odds = pot_odds(view, valid);

    if valid.can_check {
        if equity > 0.65 && valid.can_raise {
            return (BettingAction::Raise, pot_size_bet(view, 0.75, valid));
        }
        if equity > 0.5 && valid.can_raise && rng.random_bool(0.3) {
            return (BettingAction::Raise, pot_size_bet(view, 0.5, valid));
        }
        return (BettingAction::Check, 0);
    }

    if equity < odds {
        return (BettingAction::Fold, 0);
    }
    if equity > 0.7 && valid.can_raise {
        return (BettingAction::Raise, pot_size_bet(view, 1.0, valid));
    }
    if equity > 0.55 && valid.can_raise && rng.random_bool(0.4) {
        return (BettingAction::Raise, pot_size_bet(view, 0.75, valid));
    }
    (BettingAction::Call, valid.call_amount)
}

fn hard(
    view: &BotView<'_>,
    valid: &ValidActions,
    equity: f32,
    rng: &mut impl Rng,
) -> (BettingAction, Chips) {
    let odds = pot_odds(view, valid);
    let in_position = in_position(view);
    let bluffing = in_position && rng.random_bool(0.15);

    if valid.can_check {
        if equity > 0.6 && valid.can_raise {
            let size = if in_position { 0.75 } else { 0.6 };
            return (BettingAction::Raise, pot_size_bet(view, size, valid));
        }
        if bluffing && valid.can_raise {
            return (BettingAction::Raise, pot_size_bet(view, 0.6, valid));
        }
        return (BettingAction::Check, 0);
    }

    if bluffing && valid.can_raise {
        return (BettingAction::Raise, pot_size_bet(view, 0.75, valid));
    }
    if equity < odds && !bluffing {
        return (BettingAction::Fold, 0);
    }
    if equity > 0.75 && valid.can_raise {
        let size = if in_position { 1.0 } else { 0.75 };
        return (BettingAction::Raise, pot_size_bet(view, size, valid));
    }
    if equity > 0.55 && valid.can_raise && in_position && rng.random_bool(0.5) {
        return (BettingAction::Raise, pot_size_bet(view, 0.6, valid));
    }
    (BettingAction::Call, valid.call_amount)
}
