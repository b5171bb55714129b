//! The per-hand phase machine.
//!
//! ```text
//! WAITING -> STARTING -> PREFLOP -> FLOP -> TURN -> RIVER -> SHOWDOWN -> HAND_OVER
//!                                     \________ ALL_FOLDED _________/      |
//!              ^-------------- (>= 2 stacks remain) --------------------- -+
//! ```
//!
//! The game is deliberately synchronous: timed transitions are driven
//! by [`PokerGame::poll`] against a caller-supplied `Instant`, so the
//! table actor owns the clock in production and tests own it in
//! assertions. Every mutation returns the events to broadcast, keeping
//! each transition atomic with respect to the fan-out.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use log::{error, info};
use thiserror::Error;

use crate::cards::{Card, Deck};
use crate::eval;
use crate::events::{self, ServerEvent, ShownHand, TableSnapshot, WinnerInfo};

use super::betting::{ActionError, BettingAction, BettingResult, BettingRound, ValidActions};
use super::pot::PotManager;
use super::rules;
use super::state::{Chips, GamePhase, GameState, GameVariant, PlayerId, PlayerState, PlayerStatus};

/// Delays between phase transitions plus the grace timeout for a
/// disconnected player on the clock.
#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    pub start_pause: Duration,
    pub street_pause: Duration,
    pub showdown_pause: Duration,
    pub action_timeout: Duration,
}

impl Pacing {
    #[must_use]
    pub fn normal() -> Self {
        Self {
            start_pause: Duration::from_secs(1),
            street_pause: Duration::from_millis(1500),
            showdown_pause: Duration::from_secs(3),
            action_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn turbo() -> Self {
        Self {
            start_pause: Duration::from_millis(500),
            street_pause: Duration::from_millis(750),
            showdown_pause: Duration::from_millis(1500),
            action_timeout: Duration::from_secs(15),
        }
    }

    #[must_use]
    pub fn hyper() -> Self {
        Self {
            start_pause: Duration::from_millis(200),
            street_pause: Duration::from_millis(300),
            showdown_pause: Duration::from_millis(600),
            action_timeout: Duration::from_secs(5),
        }
    }

    /// Zero pauses: every timed transition fires on the next poll.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            start_pause: Duration::ZERO,
            street_pause: Duration::ZERO,
            showdown_pause: Duration::ZERO,
            action_timeout: Duration::ZERO,
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SeatingError {
    #[error("game is full")]
    GameFull,
    #[error("player already seated")]
    AlreadySeated,
}

/// One table's hand loop: state, deck, pot, and the current betting
/// round. Exclusively owned by its table actor; no internal locking.
pub struct PokerGame {
    state: GameState,
    pot: PotManager,
    deck: Deck,
    betting: Option<BettingRound>,
    pacing: Pacing,
    next_step_at: Option<Instant>,
    stacked_deck: Option<Vec<Card>>,
    game_over: bool,
}

impl PokerGame {
    #[must_use]
    pub fn new(
        game_id: String,
        variant: GameVariant,
        small_blind: Chips,
        big_blind: Chips,
        max_players: usize,
        min_buy_in: Option<Chips>,
        max_buy_in: Option<Chips>,
        pacing: Pacing,
    ) -> Self {
        let state = GameState::new(
            game_id,
            variant,
            small_blind,
            big_blind,
            max_players,
            min_buy_in.unwrap_or(big_blind * 20),
            max_buy_in.unwrap_or(big_blind * 200),
        );
        Self {
            state,
            pot: PotManager::new(),
            deck: Deck::new_shuffled(),
            betting: None,
            pacing,
            next_step_at: None,
            stacked_deck: None,
            game_over: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The player the engine is waiting on, if a street is running.
    #[must_use]
    pub fn expected_actor(&self) -> Option<&PlayerState> {
        self.betting.as_ref()?;
        self.state.current_player()
    }

    #[must_use]
    pub fn valid_actions_for(&self, player_id: &str) -> Option<ValidActions> {
        self.betting
            .as_ref()?
            .valid_actions(&self.state, player_id)
            .ok()
    }

    #[must_use]
    pub fn snapshot_for(&self, viewer: &str) -> TableSnapshot {
        events::snapshot_for(&self.state, viewer)
    }

    /// Queue the given cards to be dealt, in order, on the next hand.
    /// Deterministic deals for replays and tests; live hands shuffle.
    pub fn stack_deck(&mut self, cards: Vec<Card>) {
        self.stacked_deck = Some(cards);
    }

    /// Seat a player. Mid-hand joiners get cards from the next deal.
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        name: String,
        chips: Chips,
        is_bot: bool,
    ) -> Result<(), SeatingError> {
        if self.state.players.len() >= self.state.max_players {
            return Err(SeatingError::GameFull);
        }
        if self.state.get_player(&player_id).is_some() {
            return Err(SeatingError::AlreadySeated);
        }
        let seat = self.state.players.len();
        self.state
            .players
            .push(PlayerState::new(player_id, name, chips, is_bot, seat));
        Ok(())
    }

    /// Handle a disconnect. Between hands the seat is freed; mid-hand
    /// the player stays in the hand and is queued to sit out when it
    /// ends.
    pub fn queue_sit_out(&mut self, player_id: &str) {
        if self.state.phase == GamePhase::Waiting {
            self.state.players.retain(|p| p.player_id != player_id);
            for (i, p) in self.state.players.iter_mut().enumerate() {
                p.seat = i;
            }
            if self.state.dealer_index >= self.state.players.len() {
                self.state.dealer_index = 0;
            }
        } else if let Some(p) = self.state.get_player_mut(player_id) {
            p.pending_sit_out = true;
        }
    }

    /// A sitting-out player came back (reconnect). They are dealt in
    /// again from the next hand.
    pub fn return_from_sit_out(&mut self, player_id: &str) {
        if let Some(p) = self.state.get_player_mut(player_id) {
            p.pending_sit_out = false;
            if p.status == PlayerStatus::SittingOut && p.chips > 0 {
                p.status = PlayerStatus::Active;
            }
        }
    }

    /// Advance any due timed transition. Returns the events to
    /// broadcast, in order.
    pub fn poll(&mut self, now: Instant) -> Vec<ServerEvent> {
        if self.game_over {
            return Vec::new();
        }
        match self.state.phase {
            GamePhase::Waiting => {
                if self.state.players_with_chips() >= 2 {
                    self.state.phase = GamePhase::Starting;
                    self.next_step_at = Some(now + self.pacing.start_pause);
                    vec![ServerEvent::GameState]
                } else {
                    Vec::new()
                }
            }
            GamePhase::Starting => {
                if self.take_due(now) {
                    self.begin_hand(now)
                } else {
                    Vec::new()
                }
            }
            GamePhase::Preflop | GamePhase::Flop | GamePhase::Turn | GamePhase::River => {
                if self.betting.is_none() && self.take_due(now) {
                    self.advance_street(now)
                } else {
                    Vec::new()
                }
            }
            GamePhase::Showdown | GamePhase::AllFolded => {
                if self.take_due(now) {
                    self.finish_hand(now)
                } else {
                    Vec::new()
                }
            }
            GamePhase::HandOver => {
                if self.take_due(now) {
                    self.next_hand_or_game_over(now)
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Apply a player action. On success returns the events to
    /// broadcast; on error the state is untouched and the same player
    /// is still to act.
    pub fn submit_action(
        &mut self,
        player_id: &str,
        action: BettingAction,
        amount: Chips,
        now: Instant,
    ) -> Result<Vec<ServerEvent>, ActionError> {
        let mut round = self.betting.take().ok_or(ActionError::NoActionExpected)?;
        let result = match round.apply_action(&mut self.state, player_id, action, amount) {
            Ok(result) => result,
            Err(e) => {
                self.betting = Some(round);
                return Err(e);
            }
        };

        // Mirror the chips the action moved into the pot ledger.
        let previous = self.pot.contribution(player_id);
        let player = self
            .state
            .get_player(player_id)
            .expect("the round validated the player");
        let committed = player.total_bet - previous;
        let (name, pot_after) = (player.name.clone(), self.state.pot);
        self.pot.add_contribution(player_id, committed);

        let mut out = vec![ServerEvent::ActionTaken {
            player_id: player_id.to_string(),
            name,
            action,
            amount: committed,
            pot: pot_after,
        }];

        match result {
            BettingResult::Continue => {
                let next = self
                    .state
                    .current_player()
                    .expect("a continuing round has a player to act");
                let player_id = next.player_id.clone();
                let valid = round
                    .valid_actions(&self.state, &player_id)
                    .expect("current player is seated");
                self.betting = Some(round);
                out.push(ServerEvent::YourTurn { player_id, valid });
            }
            BettingResult::RoundComplete => {
                self.next_step_at = Some(now + self.pacing.street_pause);
            }
            BettingResult::AllFolded => {
                out.extend(self.award_last_remaining(now));
            }
        }
        Ok(out)
    }

    fn take_due(&mut self, now: Instant) -> bool {
        match self.next_step_at {
            Some(at) if now >= at => {
                self.next_step_at = None;
                true
            }
            _ => false,
        }
    }

    fn begin_hand(&mut self, now: Instant) -> Vec<ServerEvent> {
        let state = &mut self.state;
        state.hand_number += 1;
        self.pot.reset();
        for p in &mut state.players {
            p.reset_for_hand();
        }

        rules::advance_dealer(state);
        let (sb_idx, bb_idx) = rules::blind_indices(state);
        rules::post_blinds(state);
        for idx in [sb_idx, bb_idx] {
            let p = &state.players[idx];
            self.pot.add_contribution(&p.player_id, p.total_bet);
        }

        self.deck = match self.stacked_deck.take() {
            Some(cards) => Deck::from_cards(cards),
            None => Deck::new_shuffled(),
        };
        for _ in 0..2 {
            for i in 0..state.players.len() {
                let p = &state.players[i];
                let dealt_in = p.status != PlayerStatus::SittingOut
                    && !p.pending_sit_out
                    && (p.chips > 0 || p.total_bet > 0);
                if dealt_in {
                    let card = self.deck.deal();
                    state.players[i].hole_cards.push(card);
                }
            }
        }

        state.phase = GamePhase::Preflop;
        state.community_cards.clear();
        info!(
            "game {}: hand {} dealt, dealer seat {}",
            state.game_id, state.hand_number, state.dealer_index
        );

        let mut out = vec![ServerEvent::HandStarting];
        out.extend(self.open_street(GamePhase::Preflop, now));
        out
    }

    /// Start betting on the given street, or schedule the next reveal
    /// when no one can act (everyone already all-in).
    fn open_street(&mut self, phase: GamePhase, now: Instant) -> Vec<ServerEvent> {
        let first = match phase {
            GamePhase::Preflop => rules::first_to_act_preflop(&self.state),
            _ => rules::first_to_act_postflop(&self.state),
        };
        let round = BettingRound::new(&mut self.state, phase, first);

        if let Some(idx) = first
            && round.completion(&self.state) == BettingResult::Continue
        {
            let player_id = self.state.players[idx].player_id.clone();
            let valid = round
                .valid_actions(&self.state, &player_id)
                .expect("first to act is seated");
            self.betting = Some(round);
            return vec![ServerEvent::YourTurn { player_id, valid }];
        }

        self.state.current_player_index = None;
        self.next_step_at = Some(now + self.pacing.street_pause);
        Vec::new()
    }

    fn advance_street(&mut self, now: Instant) -> Vec<ServerEvent> {
        for p in &mut self.state.players {
            p.bet = 0;
        }
        let next_phase = match self.state.phase {
            GamePhase::Preflop => GamePhase::Flop,
            GamePhase::Flop => GamePhase::Turn,
            GamePhase::Turn => GamePhase::River,
            GamePhase::River => return self.showdown(now),
            _ => return Vec::new(),
        };
        self.state.phase = next_phase;
        let reveal = if next_phase == GamePhase::Flop { 3 } else { 1 };
        for _ in 0..reveal {
            let card = self.deck.deal();
            self.state.community_cards.push(card);
        }

        let mut out = vec![ServerEvent::CommunityCard];
        out.extend(self.open_street(next_phase, now));
        out
    }

    fn showdown(&mut self, now: Instant) -> Vec<ServerEvent> {
        self.state.phase = GamePhase::Showdown;

        if self.state.pot != self.pot.total() {
            return self.abort_hand(now);
        }

        let live: Vec<PlayerId> = self
            .state
            .live_players_from_dealer()
            .iter()
            .map(|p| p.player_id.clone())
            .collect();

        let mut scores: HashMap<PlayerId, eval::Score> = HashMap::new();
        let mut all_hands: BTreeMap<PlayerId, ShownHand> = BTreeMap::new();
        for player_id in &live {
            let p = self
                .state
                .get_player(player_id)
                .expect("live players are seated");
            let cards: Vec<Card> = p
                .hole_cards
                .iter()
                .chain(self.state.community_cards.iter())
                .copied()
                .collect();
            let seven: &[Card; 7] = cards
                .as_slice()
                .try_into()
                .expect("two hole cards and a full board at showdown");
            let (score, _best_five) = eval::eval7(seven);
            scores.insert(player_id.clone(), score);
            all_hands.insert(
                player_id.clone(),
                ShownHand {
                    name: p.name.clone(),
                    hole_cards: p.hole_cards.clone(),
                    hand_name: eval::hand_name(score).to_string(),
                    score,
                },
            );
        }

        let mut winners = Vec::new();
        for award in self.pot.compute_payouts(&live, &scores) {
            for (player_id, amount) in award.winners {
                let p = self
                    .state
                    .get_player_mut(&player_id)
                    .expect("winners are seated");
                p.chips += amount;
                winners.push(WinnerInfo {
                    name: p.name.clone(),
                    hand: eval::hand_name(scores[&player_id]).to_string(),
                    player_id,
                    amount,
                });
            }
        }
        self.state.pot = 0;
        self.next_step_at = Some(now + self.pacing.showdown_pause);

        vec![ServerEvent::Winner {
            winners,
            all_hands: Some(all_hands),
            community_cards: self.state.community_cards.clone(),
        }]
    }

    fn award_last_remaining(&mut self, now: Instant) -> Vec<ServerEvent> {
        self.state.phase = GamePhase::AllFolded;
        self.next_step_at = Some(now + self.pacing.showdown_pause);

        let pot = self.state.pot;
        let Some(winner) = self.state.players.iter_mut().find(|p| p.is_live()) else {
            return Vec::new();
        };
        winner.chips += pot;
        let info = WinnerInfo {
            player_id: winner.player_id.clone(),
            name: winner.name.clone(),
            amount: pot,
            hand: "Last player standing".to_string(),
        };
        self.state.pot = 0;

        vec![ServerEvent::Winner {
            winners: vec![info],
            all_hands: None,
            community_cards: self.state.community_cards.clone(),
        }]
    }

    /// Pot ledger and table pot disagree: abort the hand, hand back
    /// what everyone put in, and tell the table.
    fn abort_hand(&mut self, now: Instant) -> Vec<ServerEvent> {
        error!(
            "game {}: hand {} aborted, pot {} != contributions {}",
            self.state.game_id,
            self.state.hand_number,
            self.state.pot,
            self.pot.total()
        );
        let refunds: Vec<(PlayerId, Chips)> = self
            .pot
            .contributions()
            .map(|(p, c)| (p.clone(), c))
            .collect();
        for (player_id, amount) in refunds {
            if let Some(p) = self.state.get_player_mut(&player_id) {
                p.chips += amount;
            }
        }
        self.state.pot = 0;

        let mut out = vec![ServerEvent::Error {
            message: "hand aborted: pot accounting mismatch, bets returned".to_string(),
        }];
        out.extend(self.finish_hand(now));
        out
    }

    fn finish_hand(&mut self, now: Instant) -> Vec<ServerEvent> {
        for p in &mut self.state.players {
            if p.pending_sit_out || (p.chips == 0 && p.status != PlayerStatus::SittingOut) {
                p.status = PlayerStatus::SittingOut;
                p.pending_sit_out = false;
            }
        }
        self.state.phase = GamePhase::HandOver;
        self.next_step_at = Some(now + self.pacing.start_pause);
        vec![ServerEvent::HandOver]
    }

    fn next_hand_or_game_over(&mut self, now: Instant) -> Vec<ServerEvent> {
        if self.state.players_with_chips() >= 2 {
            self.state.phase = GamePhase::Starting;
            self.next_step_at = Some(now + self.pacing.start_pause);
            return vec![ServerEvent::GameState];
        }

        self.state.phase = GamePhase::Waiting;
        self.game_over = true;
        let survivor = self
            .state
            .players
            .iter()
            .find(|p| p.status != PlayerStatus::SittingOut && p.chips > 0);
        info!(
            "game {}: over after {} hands",
            self.state.game_id, self.state.hand_number
        );
        vec![ServerEvent::GameOver {
            winner_name: survivor.map(|p| p.name.clone()).unwrap_or_default(),
            winner_chips: survivor.map(|p| p.chips).unwrap_or_default(),
        }]
    }
}
