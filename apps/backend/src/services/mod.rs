//! Application services over the domain layer.

pub mod registry;
pub mod rooms;
