//! Dealer rotation, blind posting, and first-to-act rules.

use super::state::{Chips, GameState, PlayerState, PlayerStatus};

/// Next seat clockwise from `from` that will be dealt a hand: not
/// sitting out, not queued to sit out, and holding chips.
#[must_use]
pub fn next_seat_with_chips(players: &[PlayerState], from: usize) -> Option<usize> {
    let n = players.len();
    (1..=n)
        .map(|offset| (from + offset) % n)
        .find(|&idx| {
            let p = &players[idx];
            p.status != PlayerStatus::SittingOut && !p.pending_sit_out && p.chips > 0
        })
}

/// Next seat clockwise from `from` with a move to make this street,
/// skipping folded, all-in, sitting-out, and undealt players.
#[must_use]
pub fn next_actionable_seat(players: &[PlayerState], from: usize) -> Option<usize> {
    let n = players.len();
    (1..=n)
        .map(|offset| (from + offset) % n)
        .find(|&idx| players[idx].can_act())
}

/// Move the button to the next seat that can play. Keeps the old seat
/// when no candidate exists.
pub fn advance_dealer(state: &mut GameState) -> usize {
    if let Some(next) = next_seat_with_chips(&state.players, state.dealer_index) {
        state.dealer_index = next;
    }
    state.dealer_index
}

/// `(small_blind_index, big_blind_index)` for the current dealer.
/// Heads-up, the dealer posts the small blind.
#[must_use]
pub fn blind_indices(state: &GameState) -> (usize, usize) {
    let in_hand = state
        .players
        .iter()
        .filter(|p| p.status != PlayerStatus::SittingOut && !p.pending_sit_out && p.chips > 0)
        .count();

    let sb = if in_hand == 2 {
        state.dealer_index
    } else {
        next_seat_with_chips(&state.players, state.dealer_index).unwrap_or(state.dealer_index)
    };
    let bb = next_seat_with_chips(&state.players, sb).unwrap_or(sb);
    (sb, bb)
}

/// Post the blinds, possibly short. A player whose whole stack goes in
/// on a blind is all-in before any action. Returns the amounts posted.
pub fn post_blinds(state: &mut GameState) -> (Chips, Chips) {
    let (sb_idx, bb_idx) = blind_indices(state);

    let sb_amount = post_blind(&mut state.players[sb_idx], state.small_blind);
    let bb_amount = post_blind(&mut state.players[bb_idx], state.big_blind);
    state.pot += sb_amount + bb_amount;
    (sb_amount, bb_amount)
}

fn post_blind(player: &mut PlayerState, blind: Chips) -> Chips {
    let amount = blind.min(player.chips);
    player.chips -= amount;
    player.bet = amount;
    player.total_bet = amount;
    if player.chips == 0 {
        player.status = PlayerStatus::AllIn;
    }
    amount
}

/// First to act preflop: the seat after the big blind, so the big
/// blind acts last. Heads-up this lands on the dealer.
#[must_use]
pub fn first_to_act_preflop(state: &GameState) -> Option<usize> {
    let (_, bb_idx) = blind_indices(state);
    next_actionable_seat(&state.players, bb_idx)
}

/// First to act on later streets: the first live seat left of the
/// dealer.
#[must_use]
pub fn first_to_act_postflop(state: &GameState) -> Option<usize> {
    next_actionable_seat(&state.players, state.dealer_index)
}
