//! WebSocket endpoint for real-time table events.
//!
//! A client connects to `/ws/{game_id}/{player_id}` after joining via
//! the HTTP lobby. The handler registers an outbound channel with the
//! table actor (which replies immediately with the personalized
//! `game_state` snapshot), then forwards inbound `action` and `chat`
//! messages to the actor. `ping` is answered in place with `pong`.
//! Malformed frames are logged and dropped; the connection stays open.

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};

use holdem::events::ClientMessage;
use holdem::table::{TableHandle, messages::TableMessage};

use super::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path((game_id, player_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Response {
    let Some(handle) = state.tables.get(&game_id).await else {
        return (StatusCode::NOT_FOUND, "Game not found").into_response();
    };
    ws.on_upgrade(move |socket| handle_socket(socket, handle, player_id))
}

async fn handle_socket(socket: WebSocket, handle: TableHandle, player_id: String) {
    let (mut sink, mut stream) = socket.split();
    let game_id = handle.game_id().to_string();
    info!("websocket connected: game={game_id}, player={player_id}");

    // The actor broadcasts through this channel; ping replies reuse it
    // so all frames leave through one writer task.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(32);
    if handle
        .send(TableMessage::Connect {
            player_id: player_id.clone(),
            sender: outbound_tx.clone(),
        })
        .await
        .is_err()
    {
        warn!("game {game_id} is closed, dropping websocket for {player_id}");
        return;
    }

    let send_task = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Action(payload)) => {
                    if handle
                        .send(TableMessage::Action {
                            player_id: player_id.clone(),
                            action: payload.action,
                            amount: payload.amount,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Ok(ClientMessage::Chat(payload)) => {
                    if handle
                        .send(TableMessage::Chat {
                            player_id: player_id.clone(),
                            message: payload.message,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Ok(ClientMessage::Ping) => {
                    let _ = outbound_tx.send(json!({"type": "pong"}).to_string()).await;
                }
                Err(e) => {
                    warn!("dropping malformed message from {player_id}: {e}");
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("websocket error for {player_id}: {e}");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    let _ = handle
        .send(TableMessage::Disconnect {
            player_id: player_id.clone(),
        })
        .await;
    info!("websocket disconnected: game={game_id}, player={player_id}");
}
