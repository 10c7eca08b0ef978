//! Error codes for the Storychain backend.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses and WebSocket error events.

use core::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Centralized error codes for the Storychain backend.
///
/// This enum ensures type safety and prevents the use of ad-hoc error codes.
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Room membership
    /// Room code does not map to an active room
    RoomNotFound,
    /// Join attempted after the game left the lobby
    GameInProgress,
    /// Player is already a member of the room
    DuplicatePlayer,
    /// Acting connection is not a member of the room
    NotInRoom,

    // Game flow validation
    /// Start requires at least two players
    InsufficientPlayers,
    /// Player already submitted a sentence this round
    DuplicateSubmission,
    /// Action not valid in the room's current phase
    PhaseMismatch,
    /// Submitted sentence is empty or whitespace
    EmptySentence,
    /// Player name is empty or whitespace
    InvalidPlayerName,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// General not found error
    NotFound,

    // Conflicts
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // Generation pipeline
    /// Story/comic generation failed for the whole room
    GenerationFailed,

    // System Errors
    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Every defined code, for exhaustive checks in tests.
    pub const ALL: &'static [ErrorCode] = &[
        Self::RoomNotFound,
        Self::GameInProgress,
        Self::DuplicatePlayer,
        Self::NotInRoom,
        Self::InsufficientPlayers,
        Self::DuplicateSubmission,
        Self::PhaseMismatch,
        Self::EmptySentence,
        Self::InvalidPlayerName,
        Self::ValidationError,
        Self::BadRequest,
        Self::NotFound,
        Self::Conflict,
        Self::GenerationFailed,
        Self::InternalError,
        Self::ConfigError,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    ///
    /// This is the exact string that appears on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Room membership
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::GameInProgress => "GAME_IN_PROGRESS",
            Self::DuplicatePlayer => "DUPLICATE_PLAYER",
            Self::NotInRoom => "NOT_IN_ROOM",

            // Game flow validation
            Self::InsufficientPlayers => "INSUFFICIENT_PLAYERS",
            Self::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::EmptySentence => "EMPTY_SENTENCE",
            Self::InvalidPlayerName => "INVALID_PLAYER_NAME",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            // Resource Not Found
            Self::NotFound => "NOT_FOUND",

            // Conflicts
            Self::Conflict => "CONFLICT",

            // Generation pipeline
            Self::GenerationFailed => "GENERATION_FAILED",

            // System Errors
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Serialized as the canonical string so WebSocket error events carry the
// same codes as HTTP Problem Details bodies.
impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or(())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value
            .parse()
            .map_err(|()| de::Error::custom(format!("unknown error code: {value}")))
    }
}
