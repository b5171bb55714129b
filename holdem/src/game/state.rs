//! Per-hand game state shared by the rules, betting round, and
//! orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cards::Card;

/// Whole chips. Stacks and bets are integers; there are no cents.
pub type Chips = u32;

/// Opaque player identifier assigned at join time.
pub type PlayerId = String;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    NoLimit,
    FixedLimit,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Waiting,
    Starting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    AllFolded,
    HandOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            GamePhase::Waiting => "waiting",
            GamePhase::Starting => "starting",
            GamePhase::Preflop => "preflop",
            GamePhase::Flop => "flop",
            GamePhase::Turn => "turn",
            GamePhase::River => "river",
            GamePhase::Showdown => "showdown",
            GamePhase::AllFolded => "all_folded",
            GamePhase::HandOver => "hand_over",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Folded,
    AllIn,
    SittingOut,
}

/// One seat at the table. The record outlives hands; only the
/// hand-scoped fields are reset between hands.
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub player_id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub hole_cards: Vec<Card>,
    /// Chips bet on the current street.
    pub bet: Chips,
    /// Total chips contributed this hand.
    pub total_bet: Chips,
    pub status: PlayerStatus,
    pub is_bot: bool,
    pub seat: usize,
    /// Queued sit-out (disconnect); applied when the hand ends.
    pub pending_sit_out: bool,
}

impl PlayerState {
    #[must_use]
    pub fn new(player_id: PlayerId, name: String, chips: Chips, is_bot: bool, seat: usize) -> Self {
        Self {
            player_id,
            name,
            chips,
            hole_cards: Vec::with_capacity(2),
            bet: 0,
            total_bet: 0,
            status: PlayerStatus::Active,
            is_bot,
            seat,
            pending_sit_out: false,
        }
    }

    /// Dealt into the current hand.
    #[must_use]
    pub fn was_dealt(&self) -> bool {
        self.hole_cards.len() == 2
    }

    /// Still contesting the pot: dealt in and neither folded nor
    /// sitting out.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.was_dealt() && matches!(self.status, PlayerStatus::Active | PlayerStatus::AllIn)
    }

    /// Has a move to make this street.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.was_dealt() && self.status == PlayerStatus::Active
    }

    /// Clear the hand-scoped fields ahead of a new deal.
    pub fn reset_for_hand(&mut self) {
        self.hole_cards.clear();
        self.bet = 0;
        self.total_bet = 0;
        if self.status != PlayerStatus::SittingOut {
            self.status = PlayerStatus::Active;
        }
    }
}

/// Authoritative state for one table's current hand. Mutated only by
/// the orchestrator and the betting round.
#[derive(Clone, Debug)]
pub struct GameState {
    pub game_id: String,
    pub variant: GameVariant,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub max_players: usize,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    pub phase: GamePhase,
    pub players: Vec<PlayerState>,
    pub community_cards: Vec<Card>,
    pub pot: Chips,
    pub dealer_index: usize,
    pub current_player_index: Option<usize>,
    pub hand_number: u32,
    /// Highest per-street bet among players still in the hand.
    pub current_bet: Chips,
    /// Size of the last full raise; the floor for the next one.
    pub last_raise_size: Chips,
    pub raise_count_this_street: u32,
}

impl GameState {
    #[must_use]
    pub fn new(
        game_id: String,
        variant: GameVariant,
        small_blind: Chips,
        big_blind: Chips,
        max_players: usize,
        min_buy_in: Chips,
        max_buy_in: Chips,
    ) -> Self {
        Self {
            game_id,
            variant,
            small_blind,
            big_blind,
            max_players,
            min_buy_in,
            max_buy_in,
            phase: GamePhase::Waiting,
            players: Vec::with_capacity(max_players),
            community_cards: Vec::with_capacity(5),
            pot: 0,
            dealer_index: 0,
            current_player_index: None,
            hand_number: 0,
            current_bet: 0,
            last_raise_size: 0,
            raise_count_this_street: 0,
        }
    }

    #[must_use]
    pub fn get_player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn get_player_mut(&mut self, player_id: &str) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    #[must_use]
    pub fn player_index(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.player_id == player_id)
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&PlayerState> {
        self.current_player_index.map(|i| &self.players[i])
    }

    /// Players still contesting the pot.
    #[must_use]
    pub fn live_players(&self) -> Vec<&PlayerState> {
        self.players.iter().filter(|p| p.is_live()).collect()
    }

    /// Seats that will be dealt into the next hand.
    #[must_use]
    pub fn players_with_chips(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.status != PlayerStatus::SittingOut && !p.pending_sit_out && p.chips > 0)
            .count()
    }

    /// Live players ordered clockwise starting left of the dealer.
    /// Side-pot remainders follow this order.
    #[must_use]
    pub fn live_players_from_dealer(&self) -> Vec<&PlayerState> {
        let n = self.players.len();
        (1..=n)
            .map(|offset| &self.players[(self.dealer_index + offset) % n])
            .filter(|p| p.is_live())
            .collect()
    }
}
