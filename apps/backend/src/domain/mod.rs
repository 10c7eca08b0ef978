//! Domain layer: pure room/round logic types and helpers.

pub mod redistribution;
pub mod room;
pub mod round_flow;

#[cfg(test)]
mod tests_round_flow;

// Re-exports for ergonomics
pub use redistribution::{assign_targets, Assignment};
pub use room::{Artifact, Phase, Player, PlayerId, Room, MIN_PLAYERS, MIN_ROUNDS};
pub use round_flow::{
    handle_departure, start_game, submit_sentence, RoundTransition, StartedGame,
    SubmissionProgress,
};
