//! WebSocket wire protocol: tagged JSON messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::room::{Artifact, Player, PlayerId};
use crate::errors::ErrorCode;

/// Client -> server commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    CreateRoom {
        player_name: String,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
    },
    StartGame,
    SubmitSentence {
        sentence: String,
    },
}

/// Server -> client events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Ack to the creator; the creator is the room's first player.
    RoomCreated {
        room_code: String,
    },

    /// Ack to the joiner.
    RoomJoined {
        room_code: String,
    },

    /// Current roster, broadcast on create, join, and non-emptying leave.
    PlayersUpdated {
        players: Vec<Player>,
    },

    GameStarted {
        round: u32,
        max_rounds: u32,
    },

    /// Progress broadcast after each accepted submission while the round is
    /// still incomplete.
    SubmissionReceived {
        player_id: PlayerId,
        submissions_count: usize,
        total_players: usize,
    },

    /// A new round opened; `last_sentence` is the shared "continue this
    /// story" prompt.
    NextRound {
        round: u32,
        max_rounds: u32,
        last_sentence: String,
    },

    /// The final round completed; artifact generation is in flight.
    GeneratingComics,

    ComicsReady {
        comics: BTreeMap<PlayerId, Artifact>,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}
