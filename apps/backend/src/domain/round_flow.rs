//! Round lifecycle transitions for a room.
//!
//! Pure functions over [`Room`]: they mutate state and return transition
//! values describing what happened. Callers (the room service) translate
//! transitions into outbound events; nothing here knows about transport.

use std::collections::BTreeMap;
use std::mem;

use rand::Rng;

use crate::domain::redistribution::assign_targets;
use crate::domain::room::{Phase, PlayerId, Room, MIN_PLAYERS};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Counts for progress display while a round is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionProgress {
    pub submissions_count: usize,
    pub total_players: usize,
}

/// Outcome of a round-completion check after a submission or a departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundTransition {
    /// Round still incomplete.
    Waiting(SubmissionProgress),
    /// All current players submitted and more rounds remain. `last_sentence`
    /// is the prompt shown to every player for the new round.
    RoundAdvanced {
        round: u32,
        max_rounds: u32,
        last_sentence: String,
    },
    /// The final round just completed; the room is now awaiting generation.
    /// Carries the finished chains so the caller can hand them to the
    /// generation pipeline without re-locking the room.
    GameEnded {
        chains: BTreeMap<PlayerId, Vec<String>>,
    },
}

/// Payload for the game-started notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedGame {
    pub round: u32,
    pub max_rounds: u32,
}

/// Begin the game: requires the lobby phase and at least two players.
///
/// Resets the round counter, clears any stale submissions, and creates one
/// empty chain per current player.
pub fn start_game(room: &mut Room) -> Result<StartedGame, DomainError> {
    room.require_phase(Phase::Lobby)?;
    if room.player_count() < MIN_PLAYERS {
        return Err(DomainError::validation(
            ValidationKind::InsufficientPlayers,
            format!("Need at least {MIN_PLAYERS} players to start"),
        ));
    }

    room.phase = Phase::Playing;
    room.current_round = 1;
    room.submissions.clear();
    room.chains = room
        .players
        .iter()
        .map(|p| (p.id, Vec::new()))
        .collect();

    Ok(StartedGame {
        round: room.current_round,
        max_rounds: room.max_rounds,
    })
}

/// Record one player's sentence for the in-flight round.
///
/// The completing submission advances the round within the same serialized
/// step, so round N's redistribution is fully applied before any round N+1
/// submission can be observed.
pub fn submit_sentence<R: Rng + ?Sized>(
    room: &mut Room,
    player_id: PlayerId,
    sentence: &str,
    rng: &mut R,
) -> Result<RoundTransition, DomainError> {
    room.require_phase(Phase::Playing)?;
    room.require_member(player_id)?;

    let sentence = sentence.trim();
    if sentence.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::EmptySentence,
            "Sentence must not be empty",
        ));
    }
    if room.submissions.contains_key(&player_id) {
        return Err(DomainError::conflict(
            ConflictKind::DuplicateSubmission,
            format!(
                "Player {player_id} already submitted for round {}",
                room.current_round
            ),
        ));
    }

    room.submissions.insert(player_id, sentence.to_string());

    if round_complete(room) {
        Ok(advance_round(room, rng))
    } else {
        Ok(RoundTransition::Waiting(SubmissionProgress {
            submissions_count: room.submissions.len(),
            total_players: room.player_count(),
        }))
    }
}

/// Re-run the completion check after a player left mid-game.
///
/// A departed player's chain and pending submission stay in the maps, but
/// the completion check only counts current players, so the departure of
/// the last non-submitter completes the round. Returns `None` when nothing
/// changed (not playing, room empty, or submissions still outstanding).
pub fn handle_departure<R: Rng + ?Sized>(room: &mut Room, rng: &mut R) -> Option<RoundTransition> {
    if room.phase != Phase::Playing || room.is_empty() || !round_complete(room) {
        return None;
    }
    Some(advance_round(room, rng))
}

/// A round is complete when every current player has submitted.
fn round_complete(room: &Room) -> bool {
    !room.is_empty()
        && room
            .players
            .iter()
            .all(|p| room.submissions.contains_key(&p.id))
}

/// Apply the completed round's submissions to the chains and either open
/// the next round or end the game.
fn advance_round<R: Rng + ?Sized>(room: &mut Room, rng: &mut R) -> RoundTransition {
    let entries: Vec<(PlayerId, String)> = mem::take(&mut room.submissions).into_iter().collect();

    if room.current_round == 1 {
        // Seeding round: every sentence starts its author's own chain.
        for (author, sentence) in entries {
            room.chains.entry(author).or_default().push(sentence);
        }
    } else {
        let submitters: Vec<PlayerId> = entries.iter().map(|(id, _)| *id).collect();
        let assignments = assign_targets(&submitters, rng);
        for ((_, sentence), assignment) in entries.into_iter().zip(assignments) {
            room.chains
                .entry(assignment.target)
                .or_default()
                .push(sentence);
        }
    }

    if room.current_round < room.max_rounds {
        room.current_round += 1;
        RoundTransition::RoundAdvanced {
            round: room.current_round,
            max_rounds: room.max_rounds,
            last_sentence: next_round_prompt(room),
        }
    } else {
        room.phase = Phase::AwaitingGeneration;
        RoundTransition::GameEnded {
            chains: room.chains.clone(),
        }
    }
}

/// The "continue this story" prompt for a new round: the last sentence of
/// the first non-empty chain in ascending player-id order. Every player is
/// shown the same sentence.
fn next_round_prompt(room: &Room) -> String {
    room.chains
        .values()
        .find(|chain| !chain.is_empty())
        .and_then(|chain| chain.last())
        .cloned()
        .unwrap_or_default()
}
