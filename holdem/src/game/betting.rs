//! One street of betting under no-limit or fixed-limit rules.
//!
//! The round owns only street-scoped bookkeeping (who has acted, the
//! fixed bet size); the table-visible fields (`current_bet`,
//! `last_raise_size`, `raise_count_this_street`) live on [`GameState`].
//! Raise amounts are always the TOTAL bet after the raise, not the
//! increment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::state::{Chips, GamePhase, GameState, GameVariant, PlayerId, PlayerStatus};

/// Bets and raises allowed per street in fixed limit: the big blind
/// (or the opening bet) plus three raises.
pub const FIXED_LIMIT_MAX_BETS: u32 = 4;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BettingAction {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

impl fmt::Display for BettingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            BettingAction::Fold => "fold",
            BettingAction::Check => "check",
            BettingAction::Call => "call",
            BettingAction::Raise => "raise",
            BettingAction::AllIn => "all_in",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BettingResult {
    Continue,
    RoundComplete,
    AllFolded,
}

/// What the player to act may do, sent with `your_turn`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct ValidActions {
    pub can_check: bool,
    /// Chips needed to stay in, capped at the player's stack.
    pub call_amount: Chips,
    pub can_raise: bool,
    /// Minimum total bet for a valid raise.
    pub min_raise: Chips,
    /// Maximum total bet: the stack for no-limit, the fixed size for
    /// fixed limit.
    pub max_raise: Chips,
}

/// Rule violations reported back to the submitter. The engine state is
/// unchanged and keeps awaiting input from the same player.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("player {0} is not in the hand")]
    UnknownPlayer(PlayerId),
    #[error("no action is expected right now")]
    NoActionExpected,
    #[error("not your turn")]
    OutOfTurn,
    #[error("cannot check, {call_amount} to call")]
    CannotCheck { call_amount: Chips },
    #[error("raising is not allowed right now; call or fold")]
    CannotRaise,
    #[error("betting is capped this street; call or fold")]
    RaiseCapReached,
    #[error("raise to {amount} is below the minimum of {minimum}")]
    RaiseTooSmall { amount: Chips, minimum: Chips },
    #[error("raise to {amount} exceeds the maximum of {maximum}")]
    RaiseTooLarge { amount: Chips, maximum: Chips },
}

/// Drives one street. Created with `current_player_index` pointing at
/// the first to act.
#[derive(Clone, Debug)]
pub struct BettingRound {
    fixed_bet: Chips,
    /// Players who have acted since the last full raise. A short
    /// all-in does not clear this set, so it never reopens the action.
    acted: HashSet<PlayerId>,
}

impl BettingRound {
    pub fn new(state: &mut GameState, phase: GamePhase, first_to_act: Option<usize>) -> Self {
        state.current_player_index = first_to_act;
        state.current_bet = state.players.iter().map(|p| p.bet).max().unwrap_or(0);
        state.last_raise_size = state.big_blind;
        // A live blind counts as the street's opening bet.
        state.raise_count_this_street = u32::from(state.current_bet > 0);

        let fixed_bet = match state.variant {
            GameVariant::NoLimit => 0,
            GameVariant::FixedLimit => match phase {
                GamePhase::Preflop | GamePhase::Flop => state.big_blind,
                _ => state.big_blind * 2,
            },
        };

        Self {
            fixed_bet,
            acted: HashSet::new(),
        }
    }

    pub fn valid_actions(
        &self,
        state: &GameState,
        player_id: &str,
    ) -> Result<ValidActions, ActionError> {
        let player = state
            .get_player(player_id)
            .ok_or_else(|| ActionError::UnknownPlayer(player_id.to_string()))?;

        let to_call = state.current_bet.saturating_sub(player.bet);
        let call_amount = to_call.min(player.chips);
        let has_chips_to_raise = player.chips > call_amount;
        let reopened = !self.acted.contains(player_id);

        let (min_raise, max_raise, can_raise) = match state.variant {
            GameVariant::NoLimit => {
                let min = state.current_bet + state.last_raise_size.max(state.big_blind);
                let max = player.chips + player.bet;
                (min, max, has_chips_to_raise && reopened)
            }
            GameVariant::FixedLimit => {
                let fixed = state.current_bet + self.fixed_bet;
                let under_cap = state.raise_count_this_street < FIXED_LIMIT_MAX_BETS;
                (fixed, fixed, under_cap && has_chips_to_raise && reopened)
            }
        };

        Ok(ValidActions {
            can_check: to_call == 0,
            call_amount,
            can_raise,
            min_raise,
            max_raise,
        })
    }

    /// Apply one action from the player to act. Validation happens
    /// before any mutation; on error the street is untouched and the
    /// same player remains to act.
    pub fn apply_action(
        &mut self,
        state: &mut GameState,
        player_id: &str,
        action: BettingAction,
        amount: Chips,
    ) -> Result<BettingResult, ActionError> {
        let idx = state.current_player_index.ok_or(ActionError::NoActionExpected)?;
        if state.players[idx].player_id != player_id {
            return Err(ActionError::OutOfTurn);
        }
        let valid = self.valid_actions(state, player_id)?;

        match action {
            BettingAction::Fold => {
                state.players[idx].status = PlayerStatus::Folded;
                self.acted.insert(player_id.to_string());
            }
            BettingAction::Check => {
                if !valid.can_check {
                    return Err(ActionError::CannotCheck {
                        call_amount: valid.call_amount,
                    });
                }
                self.acted.insert(player_id.to_string());
            }
            BettingAction::Call => {
                // A call for less than the full amount puts the whole
                // stack in and is an all-in.
                self.commit(state, idx, valid.call_amount);
                self.acted.insert(player_id.to_string());
            }
            BettingAction::Raise => {
                let target = match state.variant {
                    GameVariant::NoLimit => amount,
                    // Fixed limit ignores the requested amount.
                    GameVariant::FixedLimit => {
                        valid.min_raise.min(state.players[idx].chips + state.players[idx].bet)
                    }
                };
                self.apply_raise(state, idx, target, &valid)?;
            }
            BettingAction::AllIn => {
                let player = &state.players[idx];
                let target = match state.variant {
                    GameVariant::NoLimit => player.chips + player.bet,
                    // Fixed limit caps a shove at the table limit; any
                    // chips beyond it stay behind.
                    GameVariant::FixedLimit => (player.chips + player.bet).min(valid.max_raise),
                };
                if target <= state.current_bet {
                    // Short of the bet: an all-in call.
                    self.commit(state, idx, valid.call_amount);
                    self.acted.insert(player_id.to_string());
                } else {
                    self.apply_raise(state, idx, target, &valid)?;
                }
            }
        }

        self.advance_current(state);
        let result = self.completion(state);
        if result != BettingResult::Continue {
            state.current_player_index = None;
        }
        Ok(result)
    }

    /// Whether the street is over, independent of whose turn it is.
    #[must_use]
    pub fn completion(&self, state: &GameState) -> BettingResult {
        let live: Vec<_> = state.players.iter().filter(|p| p.is_live()).collect();
        if live.len() <= 1 {
            return BettingResult::AllFolded;
        }
        let can_act: Vec<_> = live.iter().filter(|p| p.can_act()).collect();
        if can_act.is_empty() {
            return BettingResult::RoundComplete;
        }
        for p in can_act {
            if !self.acted.contains(&p.player_id) || p.bet < state.current_bet {
                return BettingResult::Continue;
            }
        }
        BettingResult::RoundComplete
    }

    fn apply_raise(
        &mut self,
        state: &mut GameState,
        idx: usize,
        target: Chips,
        valid: &ValidActions,
    ) -> Result<(), ActionError> {
        if !valid.can_raise {
            return Err(
                if state.variant == GameVariant::FixedLimit
                    && state.raise_count_this_street >= FIXED_LIMIT_MAX_BETS
                {
                    ActionError::RaiseCapReached
                } else {
                    ActionError::CannotRaise
                },
            );
        }
        if target > valid.max_raise {
            return Err(ActionError::RaiseTooLarge {
                amount: target,
                maximum: valid.max_raise,
            });
        }
        // Below the minimum is legal only as an all-in for less.
        let all_in_total = state.players[idx].chips + state.players[idx].bet;
        if target < valid.min_raise && target != all_in_total {
            return Err(ActionError::RaiseTooSmall {
                amount: target,
                minimum: valid.min_raise,
            });
        }
        if target <= state.current_bet {
            return Err(ActionError::RaiseTooSmall {
                amount: target,
                minimum: valid.min_raise,
            });
        }

        let min_increment = match state.variant {
            GameVariant::NoLimit => state.last_raise_size.max(state.big_blind),
            GameVariant::FixedLimit => self.fixed_bet,
        };
        let increment = target - state.current_bet;
        let full_raise = increment >= min_increment;

        let added = target - state.players[idx].bet;
        self.commit(state, idx, added);
        state.current_bet = target;

        if full_raise {
            state.last_raise_size = increment;
            state.raise_count_this_street += 1;
            // A full raise reopens the action for everyone else.
            self.acted.clear();
        }
        self.acted.insert(state.players[idx].player_id.clone());
        Ok(())
    }

    /// Move chips from the stack to the street bet. `amount` never
    /// exceeds the stack.
    fn commit(&self, state: &mut GameState, idx: usize, amount: Chips) {
        let player = &mut state.players[idx];
        player.chips -= amount;
        player.bet += amount;
        player.total_bet += amount;
        if player.chips == 0 {
            player.status = PlayerStatus::AllIn;
        }
        state.pot += amount;
    }

    fn advance_current(&self, state: &mut GameState) {
        let Some(from) = state.current_player_index else {
            return;
        };
        state.current_player_index = super::rules::next_actionable_seat(&state.players, from);
    }
}
