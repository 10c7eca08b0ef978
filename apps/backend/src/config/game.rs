use std::env;

use crate::domain::room::MIN_ROUNDS;

/// Default number of rounds for new rooms.
///
/// Read from `STORY_MAX_ROUNDS` (defaults to 3) and clamped to the engine
/// minimum of 2, since redistribution needs at least one hand-off round.
pub fn default_max_rounds() -> u32 {
    env::var("STORY_MAX_ROUNDS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(3)
        .max(MIN_ROUNDS)
}
