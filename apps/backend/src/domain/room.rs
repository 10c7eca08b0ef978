use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

/// Connection-scoped player identifier.
///
/// Assigned by the gateway when a connection is established; never reused
/// within a process. `Ord` so that map iteration over players is
/// deterministic (the next-round prompt rule depends on it).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player as shown in the lobby roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

/// Overall room progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Room created, players gathering.
    Lobby,
    /// Rounds in progress; `current_round` is 1-based.
    Playing,
    /// Final round complete; story/comic generation in flight.
    AwaitingGeneration,
    /// Generated artifacts delivered to players.
    Results,
}

/// Generated story/comic artifacts for one finished chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Coherent rewrite of the chain's sentences.
    pub story: String,
    /// Up to 4 visual panel descriptions; consumers must not assume exactly 4.
    pub panels: Vec<String>,
    /// Image URLs. Failed slots are omitted, so `images.len() <= panels.len()`.
    pub images: Vec<String>,
}

/// Entire room container, sufficient for pure domain operations.
///
/// All mutation goes through the registry's per-room lock; nothing here is
/// internally synchronized.
#[derive(Debug, Clone)]
pub struct Room {
    /// 4-char uppercase alphanumeric room code.
    pub code: String,
    /// Current members in join order (join order is user-visible in the lobby).
    pub players: Vec<Player>,
    /// Current phase of the room.
    pub phase: Phase,
    /// 1-based round counter; 0 while in the lobby.
    pub current_round: u32,
    /// Fixed at creation; at least 2.
    pub max_rounds: u32,
    /// Story chains keyed by owning player. Keys are the players present at
    /// game start and never shrink, so a departed player's chain survives.
    pub chains: BTreeMap<PlayerId, Vec<String>>,
    /// In-flight round submissions. A departed player's entry is retained
    /// until the round advances.
    pub submissions: BTreeMap<PlayerId, String>,
    /// Generated artifacts, populated when generation succeeds.
    pub results: BTreeMap<PlayerId, Artifact>,
    /// Tombstone set when the room is destroyed; a caller holding a stale
    /// `Arc` observes this instead of mutating an unmapped room.
    pub closed: bool,
}

/// Minimum players required to start a game.
pub const MIN_PLAYERS: usize = 2;
/// Redistribution needs at least one non-trivial hand-off.
pub const MIN_ROUNDS: u32 = 2;

impl Room {
    pub fn new(code: impl Into<String>, owner: Player, max_rounds: u32) -> Self {
        Self {
            code: code.into(),
            players: vec![owner],
            phase: Phase::Lobby,
            current_round: 0,
            max_rounds: max_rounds.max(MIN_ROUNDS),
            chains: BTreeMap::new(),
            submissions: BTreeMap::new(),
            results: BTreeMap::new(),
            closed: false,
        }
    }

    #[inline]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    pub fn contains_player(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// Snapshot of the roster for `players_updated` events.
    pub fn roster(&self) -> Vec<Player> {
        self.players.clone()
    }

    /// Append a player in the lobby. Never replaces an existing member.
    pub fn add_player(&mut self, player: Player) -> Result<(), DomainError> {
        if self.phase != Phase::Lobby {
            return Err(DomainError::conflict(
                ConflictKind::GameInProgress,
                "Game already in progress",
            ));
        }
        if self.contains_player(player.id) {
            return Err(DomainError::conflict(
                ConflictKind::DuplicatePlayer,
                format!("Player {} already joined room {}", player.id, self.code),
            ));
        }
        self.players.push(player);
        Ok(())
    }

    /// Remove a player from the roster, leaving chains and submissions
    /// untouched. Returns whether the player was present.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != before
    }

    pub fn require_phase(&self, expected: Phase) -> Result<(), DomainError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(DomainError::validation(
                crate::errors::domain::ValidationKind::PhaseMismatch,
                format!(
                    "Room {} is in phase {:?}, expected {:?}",
                    self.code, self.phase, expected
                ),
            ))
        }
    }

    pub fn require_member(&self, id: PlayerId) -> Result<(), DomainError> {
        if self.contains_player(id) {
            Ok(())
        } else {
            Err(DomainError::not_found(
                NotFoundKind::Player,
                format!("Player {id} is not a member of room {}", self.code),
            ))
        }
    }
}
