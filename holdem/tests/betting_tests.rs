//! Street-level betting rules: min-raise, the fixed-limit cap, short
//! all-ins, and chip conservation.

use holdem::game::betting::{
    ActionError, BettingAction, BettingResult, BettingRound, ValidActions,
};
use holdem::game::rules;
use holdem::game::state::{
    Chips, GamePhase, GameState, GameVariant, PlayerState, PlayerStatus,
};

fn table(
    variant: GameVariant,
    stacks: &[Chips],
    dealer: usize,
    small_blind: Chips,
    big_blind: Chips,
) -> GameState {
    let mut state = GameState::new(
        "t".into(),
        variant,
        small_blind,
        big_blind,
        9,
        big_blind * 20,
        big_blind * 200,
    );
    for (i, &chips) in stacks.iter().enumerate() {
        let mut p = PlayerState::new(format!("p{i}"), format!("p{i}"), chips, false, i);
        p.hole_cards = vec![
            format!("{}c", "23456789".chars().nth(i).unwrap()).parse().unwrap(),
            format!("{}d", "23456789".chars().nth(i).unwrap()).parse().unwrap(),
        ];
        state.players.push(p);
    }
    state.dealer_index = dealer;
    state.phase = GamePhase::Preflop;
    state
}

fn preflop(state: &mut GameState) -> BettingRound {
    rules::post_blinds(state);
    let first = rules::first_to_act_preflop(state);
    BettingRound::new(state, GamePhase::Preflop, first)
}

fn bank(state: &GameState) -> u64 {
    state.players.iter().map(|p| u64::from(p.chips)).sum::<u64>() + u64::from(state.pot)
}

fn current(state: &GameState) -> String {
    state.current_player().unwrap().player_id.clone()
}

#[test]
fn test_fixed_limit_cap_is_four_bets() {
    // Blind 20 opens the street; raises run 40, 60, 80 and the cap is
    // in. The fifth bet is rejected with the state untouched.
    let mut state = table(GameVariant::FixedLimit, &[1000, 1000, 1000], 0, 10, 20);
    let mut round = preflop(&mut state);
    assert_eq!(state.raise_count_this_street, 1);
    assert_eq!(current(&state), "p0");

    assert_eq!(
        round.apply_action(&mut state, "p0", BettingAction::Raise, 0).unwrap(),
        BettingResult::Continue
    );
    assert_eq!(state.current_bet, 40);
    round.apply_action(&mut state, "p1", BettingAction::Raise, 0).unwrap();
    assert_eq!(state.current_bet, 60);
    round.apply_action(&mut state, "p2", BettingAction::Raise, 0).unwrap();
    assert_eq!(state.current_bet, 80);
    assert_eq!(state.raise_count_this_street, 4);

    let before_chips = state.players[0].chips;
    let before_bank = bank(&state);
    assert_eq!(
        round.apply_action(&mut state, "p0", BettingAction::Raise, 0),
        Err(ActionError::RaiseCapReached)
    );
    assert_eq!(state.players[0].chips, before_chips);
    assert_eq!(state.current_bet, 80);
    assert_eq!(bank(&state), before_bank);
    assert_eq!(current(&state), "p0");

    // Capped players may still call.
    round.apply_action(&mut state, "p0", BettingAction::Call, 0).unwrap();
    assert_eq!(state.players[0].bet, 80);
}

#[test]
fn test_fixed_limit_big_bet_streets() {
    // Turn and river bet double: with a 20 blind the turn bet is 40.
    let mut state = table(GameVariant::FixedLimit, &[1000, 1000, 1000], 0, 10, 20);
    state.phase = GamePhase::Turn;
    let first = rules::first_to_act_postflop(&state);
    let mut round = BettingRound::new(&mut state, GamePhase::Turn, first);
    assert_eq!(state.raise_count_this_street, 0);

    let first_actor = current(&state);
    round
        .apply_action(&mut state, &first_actor, BettingAction::Raise, 0)
        .unwrap();
    assert_eq!(state.current_bet, 40);
}

#[test]
fn test_nlhe_minimum_raise_floor() {
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 1000], 0, 5, 10);
    let mut round = preflop(&mut state);
    assert_eq!(current(&state), "p0");

    // Opening raise must reach current_bet + big_blind = 20.
    assert_eq!(
        round.apply_action(&mut state, "p0", BettingAction::Raise, 15),
        Err(ActionError::RaiseTooSmall {
            amount: 15,
            minimum: 20
        })
    );
    round.apply_action(&mut state, "p0", BettingAction::Raise, 25).unwrap();
    assert_eq!(state.last_raise_size, 15);

    // The next raise floor grows by the last raise size: 25 + 15.
    assert_eq!(
        round.apply_action(&mut state, "p1", BettingAction::Raise, 30),
        Err(ActionError::RaiseTooSmall {
            amount: 30,
            minimum: 40
        })
    );
    round.apply_action(&mut state, "p1", BettingAction::Raise, 40).unwrap();
    assert_eq!(state.current_bet, 40);
}

#[test]
fn test_short_all_in_does_not_reopen_action() {
    // Blinds 5/10. A raises to 30, B calls, C jams for 45 (an
    // increment of 15, short of the 20 minimum). A may call or fold
    // but can no longer raise.
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 1000, 1000, 45], 4, 5, 10);
    let mut round = preflop(&mut state);
    assert_eq!(current(&state), "p2");

    round.apply_action(&mut state, "p2", BettingAction::Raise, 30).unwrap();
    assert_eq!(state.last_raise_size, 20);
    round.apply_action(&mut state, "p3", BettingAction::Call, 0).unwrap();
    round.apply_action(&mut state, "p4", BettingAction::AllIn, 0).unwrap();
    assert_eq!(state.current_bet, 45);
    assert_eq!(state.players[4].status, PlayerStatus::AllIn);
    // The short jam is not a full raise.
    assert_eq!(state.last_raise_size, 20);

    round.apply_action(&mut state, "p0", BettingAction::Fold, 0).unwrap();
    round.apply_action(&mut state, "p1", BettingAction::Fold, 0).unwrap();

    assert_eq!(current(&state), "p2");
    let before = bank(&state);
    assert_eq!(
        round.apply_action(&mut state, "p2", BettingAction::Raise, 60),
        Err(ActionError::CannotRaise)
    );
    assert_eq!(bank(&state), before);
    assert_eq!(current(&state), "p2");

    round.apply_action(&mut state, "p2", BettingAction::Call, 0).unwrap();
    assert_eq!(state.players[2].bet, 45);
    let result = round.apply_action(&mut state, "p3", BettingAction::Call, 0).unwrap();
    assert_eq!(result, BettingResult::RoundComplete);
}

#[test]
fn test_full_raise_reopens_action() {
    // After a genuine raise, a player who already acted may raise
    // again.
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 1000], 0, 5, 10);
    let mut round = preflop(&mut state);

    round.apply_action(&mut state, "p0", BettingAction::Raise, 30).unwrap();
    round.apply_action(&mut state, "p1", BettingAction::Raise, 90).unwrap();
    round.apply_action(&mut state, "p2", BettingAction::Fold, 0).unwrap();

    let valid = round.valid_actions(&state, "p0").unwrap();
    assert!(valid.can_raise);
    round.apply_action(&mut state, "p0", BettingAction::Raise, 160).unwrap();
    assert_eq!(state.current_bet, 160);
}

#[test]
fn test_check_requires_nothing_to_call() {
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 1000], 0, 5, 10);
    let mut round = preflop(&mut state);

    assert_eq!(
        round.apply_action(&mut state, "p0", BettingAction::Check, 0),
        Err(ActionError::CannotCheck { call_amount: 10 })
    );
}

#[test]
fn test_big_blind_gets_the_option() {
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 1000], 0, 5, 10);
    let mut round = preflop(&mut state);

    // Everyone limps around to the big blind.
    assert_eq!(
        round.apply_action(&mut state, "p0", BettingAction::Call, 0).unwrap(),
        BettingResult::Continue
    );
    assert_eq!(
        round.apply_action(&mut state, "p1", BettingAction::Call, 0).unwrap(),
        BettingResult::Continue
    );

    // The blind poster has not acted yet and may check or raise.
    let valid: ValidActions = round.valid_actions(&state, "p2").unwrap();
    assert!(valid.can_check);
    assert!(valid.can_raise);
    assert_eq!(
        round.apply_action(&mut state, "p2", BettingAction::Check, 0).unwrap(),
        BettingResult::RoundComplete
    );
}

#[test]
fn test_fold_to_one_short_circuits() {
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 1000], 0, 5, 10);
    let mut round = preflop(&mut state);

    round.apply_action(&mut state, "p0", BettingAction::Fold, 0).unwrap();
    let result = round.apply_action(&mut state, "p1", BettingAction::Fold, 0).unwrap();
    assert_eq!(result, BettingResult::AllFolded);
}

#[test]
fn test_out_of_turn_is_rejected() {
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 1000], 0, 5, 10);
    let mut round = preflop(&mut state);

    assert_eq!(current(&state), "p0");
    assert_eq!(
        round.apply_action(&mut state, "p1", BettingAction::Call, 0),
        Err(ActionError::OutOfTurn)
    );
    assert_eq!(
        round.apply_action(&mut state, "nobody", BettingAction::Fold, 0),
        Err(ActionError::OutOfTurn)
    );
}

#[test]
fn test_short_call_is_an_all_in() {
    let mut state = table(GameVariant::NoLimit, &[1000, 1000, 30], 0, 5, 10);
    let mut round = preflop(&mut state);

    round.apply_action(&mut state, "p0", BettingAction::Raise, 100).unwrap();
    round.apply_action(&mut state, "p1", BettingAction::Fold, 0).unwrap();
    round.apply_action(&mut state, "p2", BettingAction::Call, 0).unwrap();

    let shorty = state.get_player("p2").unwrap();
    assert_eq!(shorty.status, PlayerStatus::AllIn);
    assert_eq!(shorty.chips, 0);
    assert_eq!(shorty.bet, 30);
}

#[test]
fn test_chips_are_conserved_through_a_street() {
    let mut state = table(GameVariant::NoLimit, &[500, 800, 1000, 45], 0, 5, 10);
    let start = bank(&state);
    let mut round = preflop(&mut state);
    assert_eq!(bank(&state), start);

    let script = [
        ("p3", BettingAction::AllIn, 0),
        ("p0", BettingAction::Raise, 100),
        ("p1", BettingAction::Call, 0),
        ("p2", BettingAction::Fold, 0),
    ];
    for (player, action, amount) in script {
        round.apply_action(&mut state, player, action, amount).unwrap();
        assert_eq!(bank(&state), start);
    }
}
