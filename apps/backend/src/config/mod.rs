//! Environment-driven configuration, read once at startup.

pub mod game;
pub mod generation;
