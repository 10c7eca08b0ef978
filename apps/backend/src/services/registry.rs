//! Room Registry: the shared code -> room map and membership lifecycle.
//!
//! Rooms live behind `Arc<parking_lot::Mutex<Room>>` in a `DashMap`. Lookups
//! clone the `Arc` out of the shard before locking the room, so a map shard
//! lock is never held while a room mutex is taken. Destruction tombstones
//! the room (`closed = true`) under its lock before unmapping the code, so
//! a caller holding a stale `Arc` observes the tombstone and treats the
//! room as gone.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info};

use crate::domain::room::{Player, PlayerId, Room};
use crate::domain::round_flow::{self, RoundTransition};
use crate::errors::domain::DomainError;
use crate::utils::room_code::generate_room_code;

pub type SharedRoom = Arc<Mutex<Room>>;

/// Outcome of removing a player from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// Unknown or closed code, or the player was not a member.
    NotFound,
    /// The last player left; the room was tombstoned and unmapped.
    Destroyed,
    /// The player left a still-populated room. `transition` is present when
    /// the departure completed the in-flight round.
    Remaining {
        players: Vec<Player>,
        transition: Option<RoundTransition>,
    },
}

/// In-memory registry of active rooms.
pub struct RoomRegistry {
    rooms: DashMap<String, SharedRoom>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Create a room with a fresh collision-checked code and the owner as
    /// its sole player. The entry API makes the check-and-insert atomic.
    pub fn create_room<R: Rng + ?Sized>(
        &self,
        owner: Player,
        max_rounds: u32,
        rng: &mut R,
    ) -> String {
        let owner_id = owner.id;
        loop {
            let code = generate_room_code(rng);
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(Mutex::new(Room::new(
                        code.clone(),
                        owner,
                        max_rounds,
                    ))));
                    info!(
                        room_code = code.as_str(),
                        player_id = %owner_id,
                        max_rounds,
                        "Room created"
                    );
                    return code;
                }
            }
        }
    }

    /// Add a player to a lobby-phase room. Returns the roster after the
    /// join for the `players_updated` broadcast.
    pub fn join_room(&self, code: &str, player: Player) -> Result<Vec<Player>, DomainError> {
        let room = self.get(code).ok_or_else(|| DomainError::room_not_found(code))?;
        let mut room = room.lock();
        if room.closed {
            return Err(DomainError::room_not_found(code));
        }
        let player_id = player.id;
        room.add_player(player)?;
        info!(
            room_code = code,
            player_id = %player_id,
            players = room.player_count(),
            "Player joined room"
        );
        Ok(room.roster())
    }

    /// Clone out the room handle for a code. Callers must re-check
    /// `room.closed` after locking.
    pub fn get(&self, code: &str) -> Option<SharedRoom> {
        self.rooms.get(code).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a player. A room emptied by the removal is destroyed;
    /// otherwise the round engine re-runs the completion check, since the
    /// departure of the last non-submitter completes the round.
    pub fn remove_player<R: Rng + ?Sized>(
        &self,
        code: &str,
        player_id: PlayerId,
        rng: &mut R,
    ) -> Removal {
        let Some(room) = self.get(code) else {
            return Removal::NotFound;
        };
        let mut room = room.lock();
        if room.closed || !room.remove_player(player_id) {
            return Removal::NotFound;
        }

        if room.is_empty() {
            room.closed = true;
            drop(room);
            self.rooms.remove(code);
            info!(room_code = code, %player_id, "Last player left, room destroyed");
            return Removal::Destroyed;
        }

        let transition = round_flow::handle_departure(&mut room, rng);
        debug!(
            room_code = code,
            %player_id,
            remaining = room.player_count(),
            completed_round = transition.is_some(),
            "Player left room"
        );
        Removal::Remaining {
            players: room.roster(),
            transition,
        }
    }

    /// Tombstone and unmap a room regardless of membership. Used for
    /// generation-failure teardown.
    pub fn remove_room(&self, code: &str) -> bool {
        let Some(room) = self.get(code) else {
            return false;
        };
        room.lock().closed = true;
        let removed = self.rooms.remove(code).is_some();
        if removed {
            info!(room_code = code, "Room closed");
        }
        removed
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
