//! Messages understood by a table actor.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::game::betting::BettingAction;
use crate::game::state::{Chips, PlayerId};

#[derive(Debug)]
pub enum TableMessage {
    /// Seat a new human player with a buy-in.
    Join {
        name: String,
        buy_in: Chips,
        response: oneshot::Sender<Result<JoinedPlayer, JoinError>>,
    },

    /// Register a client's outbound channel. The actor immediately
    /// sends the personalized `game_state` snapshot.
    Connect {
        player_id: PlayerId,
        sender: mpsc::Sender<String>,
    },

    /// The client's socket closed. The seat is queued to sit out once
    /// the current hand finishes.
    Disconnect { player_id: PlayerId },

    /// A betting action from a connected client.
    Action {
        player_id: PlayerId,
        action: BettingAction,
        amount: Chips,
    },

    /// Table chat, broadcast to everyone.
    Chat { player_id: PlayerId, message: String },

    /// Lobby listing data.
    GetInfo { response: oneshot::Sender<TableInfo> },

    /// Personalized state snapshot for an HTTP poll.
    GetSnapshot {
        viewer: String,
        response: oneshot::Sender<serde_json::Value>,
    },

    /// Shut the table down.
    Close,
}

#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
pub enum JoinError {
    #[error("game is full")]
    GameFull,
    #[error("already seated at this table")]
    AlreadySeated,
    #[error("buy-in must be between {min} and {max}")]
    InvalidBuyIn { min: Chips, max: Chips },
}

#[derive(Clone, Debug, Serialize)]
pub struct JoinedPlayer {
    pub player_id: PlayerId,
    pub game_id: String,
    pub name: String,
    pub chips: Chips,
}

/// Summary row for the lobby list.
#[derive(Clone, Debug, Serialize)]
pub struct TableInfo {
    pub game_id: String,
    pub name: String,
    pub variant: crate::game::state::GameVariant,
    pub phase: String,
    pub players: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub hand_number: u32,
    pub speed: String,
}
