//! HTTP lobby and WebSocket API.
//!
//! ```text
//! GET  /health                      - liveness check
//! GET  /api/games                   - list tables
//! POST /api/games                   - create a table (optionally with bots)
//! POST /api/games/{game_id}/join    - buy in and take a seat
//! GET  /api/games/{game_id}/state   - personalized state snapshot
//! GET  /ws/{game_id}/{player_id}    - real-time event stream
//! ```

pub mod games;
pub mod websocket;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use holdem::table::TableManager;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<TableManager>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/games", get(games::list_games).post(games::create_game))
        .route("/api/games/{game_id}/join", post(games::join_game))
        .route("/api/games/{game_id}/state", get(games::get_game_state))
        .route("/ws/{game_id}/{player_id}", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
