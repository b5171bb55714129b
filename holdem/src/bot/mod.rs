//! Bot players: hand-strength estimation and a difficulty-tiered
//! strategy engine.

pub mod strategy;
pub mod strength;

pub use strategy::{BotPlayer, BotView};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    /// Calls too much, rarely raises.
    Easy,
    /// Pot-odds aware.
    #[default]
    Medium,
    /// Adds position awareness and occasional bluffs.
    Hard,
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Medium => "medium",
            BotDifficulty::Hard => "hard",
        };
        write!(f, "{repr}")
    }
}
