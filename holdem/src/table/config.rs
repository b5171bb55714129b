//! Table configuration.

use serde::{Deserialize, Serialize};

use crate::bot::BotDifficulty;
use crate::game::orchestrator::Pacing;
use crate::game::state::{Chips, GameVariant};

/// How quickly the table moves between streets and hands.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSpeed {
    #[default]
    Normal,
    Turbo,
    Hyper,
}

impl TableSpeed {
    #[must_use]
    pub fn pacing(self) -> Pacing {
        match self {
            TableSpeed::Normal => Pacing::normal(),
            TableSpeed::Turbo => Pacing::turbo(),
            TableSpeed::Hyper => Pacing::hyper(),
        }
    }
}

impl std::fmt::Display for TableSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            TableSpeed::Normal => "normal",
            TableSpeed::Turbo => "turbo",
            TableSpeed::Hyper => "hyper",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableConfig {
    pub name: String,
    pub variant: GameVariant,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub max_players: usize,
    /// Defaults to 20 big blinds.
    pub min_buy_in: Option<Chips>,
    /// Defaults to 200 big blinds.
    pub max_buy_in: Option<Chips>,
    pub num_bots: usize,
    pub bot_difficulty: BotDifficulty,
    pub bot_stack: Chips,
    pub speed: TableSpeed,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Table".to_string(),
            variant: GameVariant::NoLimit,
            small_blind: 10,
            big_blind: 20,
            max_players: 6,
            min_buy_in: None,
            max_buy_in: None,
            num_bots: 0,
            bot_difficulty: BotDifficulty::Medium,
            bot_stack: 1000,
            speed: TableSpeed::Normal,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind == 0 {
            return Err("small_blind must be positive".to_string());
        }
        if self.big_blind < self.small_blind * 2 {
            return Err("big_blind must be at least twice the small blind".to_string());
        }
        if !(2..=9).contains(&self.max_players) {
            return Err("max_players must be between 2 and 9".to_string());
        }
        if self.num_bots > 8 || self.num_bots >= self.max_players {
            return Err("too many bots for this table".to_string());
        }
        if self.num_bots > 0 && self.bot_stack == 0 {
            return Err("bot_stack must be positive".to_string());
        }
        if let (Some(min), Some(max)) = (self.min_buy_in, self.max_buy_in)
            && min > max
        {
            return Err("min_buy_in exceeds max_buy_in".to_string());
        }
        Ok(())
    }
}
