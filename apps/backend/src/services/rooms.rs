//! Room Service: session-facing orchestration over the registry, the round
//! engine, and the generation pipeline.
//!
//! Methods validate input, run the domain operation under the room lock,
//! and return transition values for the gateway to translate into outbound
//! events. Generation runs off the lock: the caller receives the chains
//! snapshot with `GameEnded` and hands it to [`RoomService::run_generation`]
//! in a spawned task.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::room::{Artifact, Phase, Player, PlayerId};
use crate::domain::round_flow::{self, RoundTransition, StartedGame};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::generation::ArtifactGenerator;
use crate::services::registry::{Removal, RoomRegistry};
use crate::utils::room_code::normalize_room_code;

/// Result of a successful room creation.
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub code: String,
    pub player: Player,
    pub roster: Vec<Player>,
}

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub code: String,
    pub player: Player,
    pub roster: Vec<Player>,
}

/// Outcome of an off-lock generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Artifacts were stored on the room; broadcast them.
    Ready(BTreeMap<PlayerId, Artifact>),
    /// The pipeline failed; the room was torn down.
    Failed,
    /// The room was destroyed while generating; nothing to broadcast.
    RoomGone,
}

pub struct RoomService {
    registry: Arc<RoomRegistry>,
    generator: Arc<dyn ArtifactGenerator>,
    default_max_rounds: u32,
}

impl RoomService {
    pub fn new(
        registry: Arc<RoomRegistry>,
        generator: Arc<dyn ArtifactGenerator>,
        default_max_rounds: u32,
    ) -> Self {
        Self {
            registry,
            generator,
            default_max_rounds,
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Create a room with the caller as sole player.
    pub fn create_room(
        &self,
        player_id: PlayerId,
        player_name: &str,
    ) -> Result<CreatedRoom, DomainError> {
        let player = build_player(player_id, player_name)?;
        let code =
            self.registry
                .create_room(player.clone(), self.default_max_rounds, &mut rand::rng());
        Ok(CreatedRoom {
            code,
            roster: vec![player.clone()],
            player,
        })
    }

    /// Join an existing lobby. The code is normalized (trimmed, uppercased)
    /// before lookup.
    pub fn join_room(
        &self,
        raw_code: &str,
        player_id: PlayerId,
        player_name: &str,
    ) -> Result<JoinedRoom, DomainError> {
        let code = normalize_room_code(raw_code);
        let player = build_player(player_id, player_name)?;
        let roster = self.registry.join_room(&code, player.clone())?;
        Ok(JoinedRoom {
            code,
            player,
            roster,
        })
    }

    /// Start the game in the caller's room.
    pub fn start_game(&self, code: &str, player_id: PlayerId) -> Result<StartedGame, DomainError> {
        let room = self
            .registry
            .get(code)
            .ok_or_else(|| DomainError::room_not_found(code))?;
        let mut room = room.lock();
        if room.closed {
            return Err(DomainError::room_not_found(code));
        }
        room.require_member(player_id)?;
        let started = round_flow::start_game(&mut room)?;
        info!(
            room_code = code,
            players = room.player_count(),
            max_rounds = started.max_rounds,
            "Game started"
        );
        Ok(started)
    }

    /// Record a sentence for the in-flight round. The completing submission
    /// advances the round inside the same lock hold.
    pub fn submit_sentence(
        &self,
        code: &str,
        player_id: PlayerId,
        sentence: &str,
    ) -> Result<RoundTransition, DomainError> {
        let room = self
            .registry
            .get(code)
            .ok_or_else(|| DomainError::room_not_found(code))?;
        let mut room = room.lock();
        if room.closed {
            return Err(DomainError::room_not_found(code));
        }
        let transition = round_flow::submit_sentence(&mut room, player_id, sentence, &mut rand::rng())?;

        match &transition {
            RoundTransition::Waiting(progress) => {
                debug!(
                    room_code = code,
                    %player_id,
                    submissions = progress.submissions_count,
                    total = progress.total_players,
                    "Submission recorded"
                );
            }
            RoundTransition::RoundAdvanced { round, .. } => {
                info!(room_code = code, round, "Round advanced");
            }
            RoundTransition::GameEnded { .. } => {
                info!(room_code = code, "Final round complete, generating artifacts");
            }
        }
        Ok(transition)
    }

    /// Remove a player from their room (disconnect or room switch).
    pub fn leave_room(&self, code: &str, player_id: PlayerId) -> Removal {
        self.registry
            .remove_player(code, player_id, &mut rand::rng())
    }

    /// Run the generation pipeline for a finished room and apply the result.
    ///
    /// Runs without the room lock; the apply step re-locks and discards the
    /// result if the room was destroyed in the meantime. A pipeline failure
    /// tears the room down.
    pub async fn run_generation(
        &self,
        code: &str,
        chains: BTreeMap<PlayerId, Vec<String>>,
    ) -> GenerationOutcome {
        info!(room_code = code, chains = chains.len(), "Generation started");
        match self.generator.generate_artifacts(&chains).await {
            Ok(results) => {
                let Some(room) = self.registry.get(code) else {
                    return GenerationOutcome::RoomGone;
                };
                let mut room = room.lock();
                if room.closed || room.phase != Phase::AwaitingGeneration {
                    return GenerationOutcome::RoomGone;
                }
                room.results = results.clone();
                room.phase = Phase::Results;
                info!(
                    room_code = code,
                    artifacts = results.len(),
                    "Generation finished, results ready"
                );
                GenerationOutcome::Ready(results)
            }
            Err(err) => {
                error!(room_code = code, error = %err, "Generation failed, tearing room down");
                if self.registry.remove_room(code) {
                    GenerationOutcome::Failed
                } else {
                    GenerationOutcome::RoomGone
                }
            }
        }
    }
}

fn build_player(id: PlayerId, name: &str) -> Result<Player, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidPlayerName,
            "Player name must not be empty",
        ));
    }
    Ok(Player {
        id,
        name: name.to_string(),
    })
}
