//! Lobby REST handlers: create, list, join, and poll state.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use holdem::bot::BotDifficulty;
use holdem::game::state::{Chips, GameVariant};
use holdem::table::messages::TableMessage;
use holdem::table::{TableConfig, TableSpeed};

use super::AppState;

type ApiError = (StatusCode, String);

fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, "Game not found".to_string())
}

fn table_unavailable() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Table is shutting down".to_string(),
    )
}

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_variant")]
    pub variant: GameVariant,
    #[serde(default = "default_small_blind")]
    pub small_blind: Chips,
    #[serde(default = "default_big_blind")]
    pub big_blind: Chips,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    #[serde(default)]
    pub min_buy_in: Option<Chips>,
    #[serde(default)]
    pub max_buy_in: Option<Chips>,
    #[serde(default)]
    pub num_bots: usize,
    #[serde(default)]
    pub bot_difficulty: BotDifficulty,
    #[serde(default = "default_bot_stack")]
    pub bot_stack: Chips,
    #[serde(default)]
    pub speed: TableSpeed,
}

fn default_variant() -> GameVariant {
    GameVariant::NoLimit
}
fn default_small_blind() -> Chips {
    10
}
fn default_big_blind() -> Chips {
    20
}
fn default_max_players() -> usize {
    6
}
fn default_bot_stack() -> Chips {
    1000
}

#[derive(Debug, Deserialize)]
pub struct JoinGameRequest {
    pub player_name: String,
    pub buy_in: Chips,
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    #[serde(default)]
    pub player_id: String,
}

pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<Value>, ApiError> {
    let config = TableConfig {
        name: req.name.unwrap_or_else(|| "Table".to_string()),
        variant: req.variant,
        small_blind: req.small_blind,
        big_blind: req.big_blind,
        max_players: req.max_players,
        min_buy_in: req.min_buy_in,
        max_buy_in: req.max_buy_in,
        num_bots: req.num_bots,
        bot_difficulty: req.bot_difficulty,
        bot_stack: req.bot_stack,
        speed: req.speed,
    };

    let game_id = state
        .tables
        .create_table(config)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    Ok(Json(json!({
        "game_id": game_id,
        "variant": req.variant,
        "small_blind": req.small_blind,
        "big_blind": req.big_blind,
        "max_players": req.max_players,
        "num_bots": req.num_bots,
    })))
}

pub async fn list_games(State(state): State<AppState>) -> Json<Value> {
    let games = state.tables.list().await;
    Json(json!({ "games": games }))
}

pub async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.player_name.is_empty() || req.player_name.len() > 30 {
        return Err((
            StatusCode::BAD_REQUEST,
            "player_name must be 1-30 characters".to_string(),
        ));
    }

    let handle = state.tables.get(&game_id).await.ok_or_else(not_found)?;
    let (tx, rx) = oneshot::channel();
    handle
        .send(TableMessage::Join {
            name: req.player_name,
            buy_in: req.buy_in,
            response: tx,
        })
        .await
        .map_err(|_| table_unavailable())?;

    let joined = rx
        .await
        .map_err(|_| table_unavailable())?
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(json!({
        "player_id": joined.player_id,
        "game_id": joined.game_id,
        "name": joined.name,
        "chips": joined.chips,
    })))
}

pub async fn get_game_state(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(query): Query<StateQuery>,
) -> Result<Json<Value>, ApiError> {
    let handle = state.tables.get(&game_id).await.ok_or_else(not_found)?;
    let (tx, rx) = oneshot::channel();
    handle
        .send(TableMessage::GetSnapshot {
            viewer: query.player_id,
            response: tx,
        })
        .await
        .map_err(|_| table_unavailable())?;

    let snapshot = rx.await.map_err(|_| table_unavailable())?;
    Ok(Json(snapshot))
}
