//! Wire protocol: inbound client messages and outbound events.
//!
//! Outbound payloads are personalized. [`render`] is a pure function
//! of `(event, viewer)` invoked once per recipient; there is no shared
//! payload that gets patched per player. Everywhere except
//! `winner.all_hands`, another player's hole cards render as `"??"`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::cards::{Card, HIDDEN_CARD};
use crate::eval::Score;
use crate::game::betting::{BettingAction, ValidActions};
use crate::game::state::{Chips, GameState, PlayerId, PlayerStatus};

/// Chat messages are truncated to this many characters.
pub const MAX_CHAT_LEN: usize = 200;

/// Messages clients send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    Action(ActionPayload),
    Chat(ChatPayload),
    Ping,
}

#[derive(Debug, Deserialize)]
pub struct ActionPayload {
    pub action: BettingAction,
    /// Total bet for raises; ignored otherwise.
    #[serde(default)]
    pub amount: Chips,
}

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub message: String,
}

/// Events the table emits. The orchestrator produces these; the table
/// actor fans them out with [`render`].
#[derive(Clone, Debug)]
pub enum ServerEvent {
    GameState,
    HandStarting,
    CommunityCard,
    /// Delivered only to the player whose turn it is.
    YourTurn {
        player_id: PlayerId,
        valid: ValidActions,
    },
    ActionTaken {
        player_id: PlayerId,
        name: String,
        action: BettingAction,
        amount: Chips,
        pot: Chips,
    },
    Winner {
        winners: Vec<WinnerInfo>,
        /// Present only for showdowns; an all-fold win reveals nothing.
        all_hands: Option<BTreeMap<PlayerId, ShownHand>>,
        community_cards: Vec<Card>,
    },
    HandOver,
    GameOver {
        winner_name: String,
        winner_chips: Chips,
    },
    Chat {
        player_id: PlayerId,
        message: String,
    },
    Error {
        message: String,
    },
    Pong,
}

#[derive(Clone, Debug, Serialize)]
pub struct WinnerInfo {
    pub player_id: PlayerId,
    pub name: String,
    pub amount: Chips,
    pub hand: String,
}

/// A hand revealed at showdown inside `winner.all_hands`.
#[derive(Clone, Debug, Serialize)]
pub struct ShownHand {
    pub name: String,
    pub hole_cards: Vec<Card>,
    pub hand_name: String,
    pub score: Score,
}

#[derive(Debug, Serialize)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub bet: Chips,
    pub total_bet: Chips,
    pub is_folded: bool,
    pub is_all_in: bool,
    pub is_bot: bool,
    pub seat: usize,
    pub is_active: bool,
    /// `"??"` per card unless the viewer owns the seat.
    pub hole_cards: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TableSnapshot {
    pub game_id: String,
    pub phase: String,
    pub variant: crate::game::state::GameVariant,
    pub players: Vec<PlayerSnapshot>,
    pub community_cards: Vec<Card>,
    pub pot: Chips,
    pub hand_number: u32,
    pub dealer_index: usize,
    pub current_player_index: Option<usize>,
    pub small_blind: Chips,
    pub big_blind: Chips,
}

/// Build the personalized state snapshot for `viewer`. Safe to send to
/// a client that connects mid-hand, including during showdown: it
/// never carries another player's cards.
#[must_use]
pub fn snapshot_for(state: &GameState, viewer: &str) -> TableSnapshot {
    let current = state.current_player().map(|p| p.player_id.clone());
    let players = state
        .players
        .iter()
        .map(|p| {
            let hole_cards = if p.player_id == viewer {
                p.hole_cards.iter().map(Card::to_string).collect()
            } else {
                p.hole_cards.iter().map(|_| HIDDEN_CARD.to_string()).collect()
            };
            PlayerSnapshot {
                player_id: p.player_id.clone(),
                name: p.name.clone(),
                chips: p.chips,
                bet: p.bet,
                total_bet: p.total_bet,
                is_folded: p.status == PlayerStatus::Folded,
                is_all_in: p.status == PlayerStatus::AllIn,
                is_bot: p.is_bot,
                seat: p.seat,
                is_active: current.as_deref() == Some(p.player_id.as_str()),
                hole_cards,
            }
        })
        .collect();

    TableSnapshot {
        game_id: state.game_id.clone(),
        phase: state.phase.to_string(),
        variant: state.variant,
        players,
        community_cards: state.community_cards.clone(),
        pot: state.pot,
        hand_number: state.hand_number,
        dealer_index: state.dealer_index,
        current_player_index: state.current_player_index,
        small_blind: state.small_blind,
        big_blind: state.big_blind,
    }
}

/// Render `event` for one recipient as a `{type, payload}` envelope.
/// Returns `None` when the event is not addressed to this viewer.
#[must_use]
pub fn render(event: &ServerEvent, state: &GameState, viewer: &str) -> Option<Value> {
    let value = match event {
        ServerEvent::GameState => json!({
            "type": "game_state",
            "payload": snapshot_for(state, viewer),
        }),
        ServerEvent::HandStarting => json!({
            "type": "hand_starting",
            "payload": snapshot_for(state, viewer),
        }),
        ServerEvent::CommunityCard => json!({
            "type": "community_card",
            "payload": {
                "phase": state.phase.to_string(),
                "community_cards": state.community_cards,
            },
        }),
        ServerEvent::YourTurn { player_id, valid } => {
            if viewer != player_id {
                return None;
            }
            json!({
                "type": "your_turn",
                "payload": {
                    "player_id": player_id,
                    "valid_actions": valid,
                },
            })
        }
        ServerEvent::ActionTaken {
            player_id,
            name,
            action,
            amount,
            pot,
        } => json!({
            "type": "action_taken",
            "payload": {
                "player_id": player_id,
                "name": name,
                "action": action,
                "amount": amount,
                "pot": pot,
            },
        }),
        ServerEvent::Winner {
            winners,
            all_hands,
            community_cards,
        } => {
            let mut payload = json!({
                "winners": winners,
                "community_cards": community_cards,
            });
            if let Some(hands) = all_hands {
                payload["all_hands"] = json!(hands);
            }
            json!({ "type": "winner", "payload": payload })
        }
        ServerEvent::HandOver => json!({
            "type": "hand_over",
            "payload": snapshot_for(state, viewer),
        }),
        ServerEvent::GameOver {
            winner_name,
            winner_chips,
        } => json!({
            "type": "game_over",
            "payload": {
                "winner_name": winner_name,
                "winner_chips": winner_chips,
            },
        }),
        ServerEvent::Chat { player_id, message } => json!({
            "type": "chat",
            "payload": { "player_id": player_id, "message": message },
        }),
        ServerEvent::Error { message } => json!({
            "type": "error",
            "payload": { "message": message },
        }),
        ServerEvent::Pong => json!({ "type": "pong" }),
    };
    Some(value)
}
