//! Scenario tests for the round lifecycle: start, submissions, advancement,
//! departures, and game end.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::domain::room::{Phase, Player, PlayerId, Room};
use crate::domain::round_flow::{
    handle_departure, start_game, submit_sentence, RoundTransition, SubmissionProgress,
};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};

fn pid(n: u128) -> PlayerId {
    PlayerId(Uuid::from_u128(n))
}

fn player(n: u128) -> Player {
    Player {
        id: pid(n),
        name: format!("player-{n}"),
    }
}

/// A lobby room with players 1..=count and the given round budget.
fn lobby(count: u128, max_rounds: u32) -> Room {
    let mut room = Room::new("TEST", player(1), max_rounds);
    for n in 2..=count {
        room.add_player(player(n)).expect("join in lobby");
    }
    room
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(12345)
}

#[test]
fn start_requires_two_players() {
    let mut room = lobby(1, 3);
    let err = start_game(&mut room).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InsufficientPlayers, _)
    ));
    assert_eq!(room.phase, Phase::Lobby);
}

#[test]
fn start_initializes_round_and_chains() {
    let mut room = lobby(3, 3);
    let started = start_game(&mut room).expect("start");
    assert_eq!(started.round, 1);
    assert_eq!(started.max_rounds, 3);
    assert_eq!(room.phase, Phase::Playing);
    assert_eq!(room.current_round, 1);
    assert_eq!(room.chains.len(), 3);
    assert!(room.chains.values().all(Vec::is_empty));
    assert!(room.submissions.is_empty());
}

#[test]
fn start_outside_lobby_is_rejected() {
    let mut room = lobby(2, 3);
    start_game(&mut room).expect("start");
    let err = start_game(&mut room).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::PhaseMismatch, _)
    ));
}

#[test]
fn submit_requires_playing_phase() {
    let mut room = lobby(2, 3);
    let err = submit_sentence(&mut room, pid(1), "hello", &mut rng()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::PhaseMismatch, _)
    ));
}

#[test]
fn submit_from_non_member_is_rejected() {
    let mut room = lobby(2, 3);
    start_game(&mut room).expect("start");
    let err = submit_sentence(&mut room, pid(99), "hello", &mut rng()).unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Player, _)));
}

#[test]
fn blank_sentence_is_rejected() {
    let mut room = lobby(2, 3);
    start_game(&mut room).expect("start");
    let err = submit_sentence(&mut room, pid(1), "   ", &mut rng()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::EmptySentence, _)
    ));
    assert!(room.submissions.is_empty());
}

#[test]
fn duplicate_submission_is_rejected_and_not_double_counted() {
    let mut room = lobby(3, 3);
    start_game(&mut room).expect("start");
    submit_sentence(&mut room, pid(1), "first", &mut rng()).expect("first submission");

    let err = submit_sentence(&mut room, pid(1), "second", &mut rng()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicateSubmission, _)
    ));
    assert_eq!(room.submissions.len(), 1);
    assert_eq!(room.submissions.get(&pid(1)).map(String::as_str), Some("first"));
}

#[test]
fn submissions_are_trimmed() {
    let mut room = lobby(2, 3);
    start_game(&mut room).expect("start");
    submit_sentence(&mut room, pid(1), "  padded sentence  ", &mut rng()).expect("submit");
    assert_eq!(
        room.submissions.get(&pid(1)).map(String::as_str),
        Some("padded sentence")
    );
}

#[test]
fn waiting_until_every_player_submits() {
    let mut room = lobby(3, 3);
    start_game(&mut room).expect("start");

    let t1 = submit_sentence(&mut room, pid(1), "one", &mut rng()).expect("submit");
    assert_eq!(
        t1,
        RoundTransition::Waiting(SubmissionProgress {
            submissions_count: 1,
            total_players: 3,
        })
    );

    let t2 = submit_sentence(&mut room, pid(2), "two", &mut rng()).expect("submit");
    assert_eq!(
        t2,
        RoundTransition::Waiting(SubmissionProgress {
            submissions_count: 2,
            total_players: 3,
        })
    );

    let t3 = submit_sentence(&mut room, pid(3), "three", &mut rng()).expect("submit");
    assert!(matches!(t3, RoundTransition::RoundAdvanced { round: 2, .. }));
}

#[test]
fn round_one_seeds_each_authors_own_chain() {
    let mut room = lobby(3, 3);
    start_game(&mut room).expect("start");
    submit_sentence(&mut room, pid(1), "alpha", &mut rng()).expect("submit");
    submit_sentence(&mut room, pid(2), "beta", &mut rng()).expect("submit");
    submit_sentence(&mut room, pid(3), "gamma", &mut rng()).expect("submit");

    assert_eq!(room.chains[&pid(1)], vec!["alpha"]);
    assert_eq!(room.chains[&pid(2)], vec!["beta"]);
    assert_eq!(room.chains[&pid(3)], vec!["gamma"]);
    assert_eq!(room.current_round, 2);
    assert!(room.submissions.is_empty());
}

/// The next-round prompt is the tail of the first non-empty chain in
/// ascending player-id order, and it is the same for everyone.
#[test]
fn next_round_prompt_comes_from_lowest_id_chain() {
    let mut room = lobby(3, 3);
    start_game(&mut room).expect("start");
    submit_sentence(&mut room, pid(3), "late id", &mut rng()).expect("submit");
    submit_sentence(&mut room, pid(1), "lowest id", &mut rng()).expect("submit");
    let transition = submit_sentence(&mut room, pid(2), "middle id", &mut rng()).expect("submit");

    match transition {
        RoundTransition::RoundAdvanced {
            round,
            max_rounds,
            last_sentence,
        } => {
            assert_eq!(round, 2);
            assert_eq!(max_rounds, 3);
            assert_eq!(last_sentence, "lowest id");
        }
        other => panic!("expected RoundAdvanced, got {other:?}"),
    }
}

/// Two players, two rounds: round 2 redistribution must swap the sentences
/// (each chain ends with the other player's line), then the game ends.
#[test]
fn two_player_game_swaps_and_ends() {
    let mut room = lobby(2, 2);
    start_game(&mut room).expect("start");

    submit_sentence(&mut room, pid(1), "Once upon a time", &mut rng()).expect("submit");
    let t = submit_sentence(&mut room, pid(2), "there was a dog.", &mut rng()).expect("submit");
    assert!(matches!(t, RoundTransition::RoundAdvanced { round: 2, .. }));

    submit_sentence(&mut room, pid(1), "The end.", &mut rng()).expect("submit");
    let t = submit_sentence(&mut room, pid(2), "Woof!", &mut rng()).expect("submit");
    match t {
        RoundTransition::GameEnded { chains } => assert_eq!(chains, room.chains),
        other => panic!("expected GameEnded, got {other:?}"),
    }

    assert_eq!(room.phase, Phase::AwaitingGeneration);
    assert_eq!(
        room.chains[&pid(1)],
        vec!["Once upon a time".to_string(), "Woof!".to_string()]
    );
    assert_eq!(
        room.chains[&pid(2)],
        vec!["there was a dog.".to_string(), "The end.".to_string()]
    );
}

/// A departing non-submitter completes the round when everyone else has
/// already submitted; the check runs against the reduced player count.
#[test]
fn departure_of_last_nonsubmitter_completes_round() {
    let mut room = lobby(3, 3);
    start_game(&mut room).expect("start");
    submit_sentence(&mut room, pid(1), "one", &mut rng()).expect("submit");
    submit_sentence(&mut room, pid(2), "two", &mut rng()).expect("submit");

    assert!(room.remove_player(pid(3)));
    let transition = handle_departure(&mut room, &mut rng());
    assert!(matches!(
        transition,
        Some(RoundTransition::RoundAdvanced { round: 2, .. })
    ));
    assert_eq!(room.chains[&pid(1)], vec!["one"]);
    assert_eq!(room.chains[&pid(2)], vec!["two"]);
    // The departed player's chain stays, one round behind.
    assert!(room.chains[&pid(3)].is_empty());
}

/// A departure while other players still owe sentences must not complete
/// the round; the remaining players' submissions do.
#[test]
fn departure_with_outstanding_submissions_keeps_waiting() {
    let mut room = lobby(3, 3);
    start_game(&mut room).expect("start");
    submit_sentence(&mut room, pid(1), "one", &mut rng()).expect("submit");

    assert!(room.remove_player(pid(3)));
    assert_eq!(handle_departure(&mut room, &mut rng()), None);
    assert_eq!(room.current_round, 1);

    let t = submit_sentence(&mut room, pid(2), "two", &mut rng()).expect("submit");
    assert!(matches!(t, RoundTransition::RoundAdvanced { round: 2, .. }));
}

/// A submitter who leaves still has their sentence redistributed when the
/// round completes without them.
#[test]
fn departed_submitters_sentence_still_lands() {
    let mut room = lobby(3, 3);
    start_game(&mut room).expect("start");
    for (n, text) in [(1, "a1"), (2, "b1"), (3, "c1")] {
        submit_sentence(&mut room, pid(n), text, &mut rng()).expect("submit");
    }
    assert_eq!(room.current_round, 2);

    submit_sentence(&mut room, pid(1), "a2", &mut rng()).expect("submit");
    assert!(room.remove_player(pid(1)));
    assert_eq!(handle_departure(&mut room, &mut rng()), None);

    submit_sentence(&mut room, pid(2), "b2", &mut rng()).expect("submit");
    let t = submit_sentence(&mut room, pid(3), "c2", &mut rng()).expect("submit");
    assert!(matches!(t, RoundTransition::RoundAdvanced { round: 3, .. }));

    let total: usize = room.chains.values().map(Vec::len).sum();
    assert_eq!(total, 6, "all six sentences must be on chains");
}

#[test]
fn last_departure_leaves_round_untouched() {
    let mut room = lobby(2, 3);
    start_game(&mut room).expect("start");
    assert!(room.remove_player(pid(1)));
    assert!(room.remove_player(pid(2)));
    // An empty room is destroyed by the registry; the engine must not
    // advance anything on the way out.
    assert_eq!(handle_departure(&mut room, &mut rng()), None);
    assert_eq!(room.current_round, 1);
}

#[test]
fn max_rounds_is_clamped_to_minimum() {
    let room = Room::new("TEST", player(1), 1);
    assert_eq!(room.max_rounds, 2);
}

#[test]
fn join_after_start_is_rejected() {
    let mut room = lobby(2, 3);
    start_game(&mut room).expect("start");
    let err = room.add_player(player(9)).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::GameInProgress, _)
    ));
}

#[test]
fn duplicate_join_is_rejected() {
    let mut room = lobby(2, 3);
    let err = room.add_player(player(2)).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicatePlayer, _)
    ));
}
