//! The table actor: one task per table owning the game, the
//! connections, and every timer.
//!
//! All orchestration for a table is serialized through this actor's
//! inbox and tick, so the game state needs no locking. Broadcasts are
//! personalized per recipient via [`events::render`]; bot delays and
//! the disconnect grace timer are deadlines checked on tick, and a
//! timer whose hand or actor has moved on is silently discarded.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::bot::{BotPlayer, BotView};
use crate::events::{self, MAX_CHAT_LEN, ServerEvent};
use crate::game::betting::BettingAction;
use crate::game::orchestrator::{Pacing, PokerGame};
use crate::game::state::{Chips, PlayerId};

use super::config::TableConfig;
use super::messages::{JoinError, JoinedPlayer, TableInfo, TableMessage};
use super::short_id;

/// Timer resolution for table housekeeping.
const TICK: Duration = Duration::from_millis(100);

/// Cheap cloneable address of a running table actor.
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    game_id: String,
}

impl TableHandle {
    #[must_use]
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub async fn send(&self, message: TableMessage) -> Result<(), TableClosed> {
        self.sender.send(message).await.map_err(|_| TableClosed)
    }
}

#[derive(Clone, Copy, Debug, thiserror::Error)]
#[error("table is closed")]
pub struct TableClosed;

/// A deferred action: a bot think-timer or a disconnected player's
/// grace timeout. Fires only if the same hand is still waiting on the
/// same player.
#[derive(Clone, Debug)]
struct PendingActor {
    player_id: PlayerId,
    hand_number: u32,
    due: Instant,
}

pub struct TableActor {
    game_id: String,
    config: TableConfig,
    pacing: Pacing,
    game: PokerGame,
    inbox: mpsc::Receiver<TableMessage>,
    connections: HashMap<PlayerId, mpsc::Sender<String>>,
    bots: HashMap<PlayerId, BotPlayer>,
    pending_bot: Option<PendingActor>,
    pending_timeout: Option<PendingActor>,
    closed: bool,
}

impl TableActor {
    #[must_use]
    pub fn new(game_id: String, config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(64);
        let pacing = config.speed.pacing();
        let mut game = PokerGame::new(
            game_id.clone(),
            config.variant,
            config.small_blind,
            config.big_blind,
            config.max_players,
            config.min_buy_in,
            config.max_buy_in,
            pacing,
        );

        let mut bots = HashMap::new();
        for i in 0..config.num_bots {
            let player_id = short_id();
            let name = format!("Bot {}", i + 1);
            if game
                .add_player(player_id.clone(), name, config.bot_stack, true)
                .is_ok()
            {
                bots.insert(player_id, BotPlayer::new(config.bot_difficulty));
            }
        }

        let handle = TableHandle {
            sender,
            game_id: game_id.clone(),
        };
        let actor = Self {
            game_id,
            config,
            pacing,
            game,
            inbox,
            connections: HashMap::new(),
            bots,
            pending_bot: None,
            pending_timeout: None,
            closed: false,
        };
        (actor, handle)
    }

    pub async fn run(mut self) {
        info!("table {} '{}' starting", self.game_id, self.config.name);
        let mut tick = interval(TICK);
        loop {
            tokio::select! {
                Some(message) = self.inbox.recv() => {
                    self.handle_message(message).await;
                    if self.closed {
                        break;
                    }
                }
                _ = tick.tick() => self.tick().await,
            }
        }
        info!("table {} closed", self.game_id);
    }

    async fn tick(&mut self) {
        let now = Instant::now();
        let events = self.game.poll(now);
        self.dispatch(events, now).await;
        self.fire_due_timers(now).await;
    }

    async fn handle_message(&mut self, message: TableMessage) {
        let now = Instant::now();
        match message {
            TableMessage::Join {
                name,
                buy_in,
                response,
            } => {
                let _ = response.send(self.handle_join(name, buy_in));
            }

            TableMessage::Connect { player_id, sender } => {
                self.connections.insert(player_id.clone(), sender);
                self.game.return_from_sit_out(&player_id);
                info!("table {}: {} connected", self.game_id, player_id);
                // The newcomer gets the current state right away; the
                // snapshot is personalized so a mid-hand (or
                // mid-showdown) connect reveals nothing.
                self.send_event_to(&player_id, &ServerEvent::GameState);
            }

            TableMessage::Disconnect { player_id } => {
                self.connections.remove(&player_id);
                self.game.queue_sit_out(&player_id);
                info!("table {}: {} disconnected", self.game_id, player_id);
                if self.expected_actor_is(&player_id) {
                    self.pending_timeout = Some(PendingActor {
                        player_id,
                        hand_number: self.game.state().hand_number,
                        due: now + self.pacing.action_timeout,
                    });
                }
            }

            TableMessage::Action {
                player_id,
                action,
                amount,
            } => {
                self.apply_action(&player_id, action, amount, now).await;
            }

            TableMessage::Chat { player_id, message } => {
                let message: String = message.chars().take(MAX_CHAT_LEN).collect();
                self.broadcast(&ServerEvent::Chat { player_id, message });
            }

            TableMessage::GetInfo { response } => {
                let _ = response.send(self.info());
            }

            TableMessage::GetSnapshot { viewer, response } => {
                let snapshot = self.game.snapshot_for(&viewer);
                let _ = response.send(serde_json::to_value(snapshot).unwrap_or_default());
            }

            TableMessage::Close => {
                self.closed = true;
            }
        }
    }

    fn handle_join(&mut self, name: String, buy_in: Chips) -> Result<JoinedPlayer, JoinError> {
        let state = self.game.state();
        if buy_in < state.min_buy_in || buy_in > state.max_buy_in {
            return Err(JoinError::InvalidBuyIn {
                min: state.min_buy_in,
                max: state.max_buy_in,
            });
        }
        let player_id = short_id();
        self.game
            .add_player(player_id.clone(), name.clone(), buy_in, false)
            .map_err(|e| match e {
                crate::game::orchestrator::SeatingError::GameFull => JoinError::GameFull,
                crate::game::orchestrator::SeatingError::AlreadySeated => JoinError::AlreadySeated,
            })?;
        info!(
            "table {}: {} joined as {} with {} chips",
            self.game_id, name, player_id, buy_in
        );
        Ok(JoinedPlayer {
            player_id,
            game_id: self.game_id.clone(),
            name,
            chips: buy_in,
        })
    }

    /// Route an action through the engine. Errors go back to the
    /// submitter only; the engine state is untouched by them.
    async fn apply_action(
        &mut self,
        player_id: &str,
        action: BettingAction,
        amount: Chips,
        now: Instant,
    ) {
        match self.game.submit_action(player_id, action, amount, now) {
            Ok(events) => {
                self.clear_timers_for(player_id);
                self.dispatch(events, now).await;
            }
            Err(e) => {
                debug!("table {}: rejected {player_id} {action}: {e}", self.game_id);
                self.send_event_to(
                    player_id,
                    &ServerEvent::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    async fn dispatch(&mut self, events: Vec<ServerEvent>, now: Instant) {
        for event in events {
            if let ServerEvent::YourTurn { player_id, .. } = &event {
                self.schedule_for(player_id.clone(), now);
            }
            self.broadcast(&event);
        }
    }

    /// Arm the deferred-action timer for whoever is now on the clock.
    fn schedule_for(&mut self, player_id: PlayerId, now: Instant) {
        self.pending_bot = None;
        self.pending_timeout = None;
        let hand_number = self.game.state().hand_number;

        if self.bots.contains_key(&player_id) {
            let delay = rand::rng().random_range(0.5..2.0);
            self.pending_bot = Some(PendingActor {
                player_id,
                hand_number,
                due: now + Duration::from_secs_f64(delay),
            });
        } else if !self.connections.contains_key(&player_id) {
            self.pending_timeout = Some(PendingActor {
                player_id,
                hand_number,
                due: now + self.pacing.action_timeout,
            });
        }
    }

    async fn fire_due_timers(&mut self, now: Instant) {
        if let Some(pending) = self.pending_bot.take_if(|p| now >= p.due) {
            if self.still_expected(&pending) {
                let (action, amount) = self.bot_decision(&pending.player_id);
                self.apply_action(&pending.player_id, action, amount, now).await;
            } else {
                debug!(
                    "table {}: dropping stale bot timer for {}",
                    self.game_id, pending.player_id
                );
            }
        }

        if let Some(pending) = self.pending_timeout.take_if(|p| now >= p.due) {
            let still_gone = !self.connections.contains_key(&pending.player_id);
            if self.still_expected(&pending) && still_gone {
                let action = match self.game.valid_actions_for(&pending.player_id) {
                    Some(valid) if valid.can_check => BettingAction::Check,
                    _ => BettingAction::Fold,
                };
                info!(
                    "table {}: auto-{action} for disconnected {}",
                    self.game_id, pending.player_id
                );
                self.apply_action(&pending.player_id, action, 0, now).await;
            }
        }
    }

    fn still_expected(&self, pending: &PendingActor) -> bool {
        self.game.state().hand_number == pending.hand_number
            && self.expected_actor_is(&pending.player_id)
    }

    fn expected_actor_is(&self, player_id: &str) -> bool {
        self.game
            .expected_actor()
            .is_some_and(|p| p.player_id == player_id)
    }

    fn clear_timers_for(&mut self, player_id: &str) {
        if self
            .pending_bot
            .as_ref()
            .is_some_and(|p| p.player_id == player_id)
        {
            self.pending_bot = None;
        }
        if self
            .pending_timeout
            .as_ref()
            .is_some_and(|p| p.player_id == player_id)
        {
            self.pending_timeout = None;
        }
    }

    /// The bot sees only its own cards and the public table state.
    fn bot_decision(&self, player_id: &str) -> (BettingAction, Chips) {
        let state = self.game.state();
        let (Some(bot), Some(valid), Some(player)) = (
            self.bots.get(player_id),
            self.game.valid_actions_for(player_id),
            state.get_player(player_id),
        ) else {
            return (BettingAction::Fold, 0);
        };

        let view = BotView {
            hole_cards: &player.hole_cards,
            community_cards: &state.community_cards,
            pot: state.pot,
            chips: player.chips,
            bet: player.bet,
            num_opponents: state.live_players().len().saturating_sub(1).max(1),
            dealer_index: state.dealer_index,
            seat_index: player.seat,
            num_players: state.players.len(),
        };
        bot.decide(&view, &valid, &mut rand::rng())
    }

    /// Fan an event out to every connection, personalized per
    /// recipient. A full channel drops the frame for that client; a
    /// closed one drops the client.
    fn broadcast(&mut self, event: &ServerEvent) {
        let state = self.game.state();
        let mut dead = Vec::new();
        for (player_id, tx) in &self.connections {
            let Some(value) = events::render(event, state, player_id) else {
                continue;
            };
            match tx.try_send(value.to_string()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        "table {}: outbound channel full for {}, dropping frame",
                        self.game_id, player_id
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => dead.push(player_id.clone()),
            }
        }
        for player_id in dead {
            self.connections.remove(&player_id);
        }
    }

    fn send_event_to(&self, player_id: &str, event: &ServerEvent) {
        if let Some(tx) = self.connections.get(player_id)
            && let Some(value) = events::render(event, self.game.state(), player_id)
        {
            let _ = tx.try_send(value.to_string());
        }
    }

    fn info(&self) -> TableInfo {
        let state = self.game.state();
        TableInfo {
            game_id: self.game_id.clone(),
            name: self.config.name.clone(),
            variant: state.variant,
            phase: state.phase.to_string(),
            players: state.players.len(),
            max_players: state.max_players,
            small_blind: state.small_blind,
            big_blind: state.big_blind,
            hand_number: state.hand_number,
            speed: self.config.speed.to_string(),
        }
    }
}
