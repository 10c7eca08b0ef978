//! WebSocket session gateway.

pub mod hub;
pub mod protocol;
pub mod session;
