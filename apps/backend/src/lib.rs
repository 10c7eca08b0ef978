#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod generation;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod ws;

// Re-exports for public API
pub use domain::room::{Artifact, Phase, Player, PlayerId, Room};
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use middleware::cors::cors_middleware;
pub use services::registry::RoomRegistry;
pub use services::rooms::RoomService;
pub use state::app_state::AppState;
pub use ws::hub::RoomHub;

// Prelude for test convenience
pub mod prelude {
    pub use super::domain::*;
    pub use super::error::*;
    pub use super::services::registry::*;
    pub use super::services::rooms::*;
    pub use super::state::app_state::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
