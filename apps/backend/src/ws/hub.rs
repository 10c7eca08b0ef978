//! In-process fan-out registry: room code -> connected session recipients.
//!
//! Sessions register when they enter a room and unregister when they leave
//! or stop. Delivery is fire-and-forget `do_send`; a session that stopped
//! between lookup and delivery just drops the message.

use actix::prelude::*;
use dashmap::DashMap;

use crate::domain::room::PlayerId;
use crate::ws::protocol::ServerMsg;

/// Envelope delivered to session actors.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct OutboundEvent(pub ServerMsg);

#[derive(Default)]
pub struct RoomHub {
    sessions: DashMap<String, DashMap<PlayerId, Recipient<OutboundEvent>>>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn register(&self, room_code: &str, player_id: PlayerId, recipient: Recipient<OutboundEvent>) {
        self.sessions
            .entry(room_code.to_string())
            .or_default()
            .insert(player_id, recipient);
    }

    pub fn unregister(&self, room_code: &str, player_id: PlayerId) {
        if let Some(members) = self.sessions.get(room_code) {
            members.remove(&player_id);
        }
        // Separate step so no shard ref is held across the removal.
        self.sessions
            .remove_if(room_code, |_, members| members.is_empty());
    }

    /// Deliver to every session registered for the room.
    pub fn broadcast(&self, room_code: &str, msg: ServerMsg) {
        if let Some(members) = self.sessions.get(room_code) {
            for recipient in members.iter() {
                let _ = recipient.value().do_send(OutboundEvent(msg.clone()));
            }
        }
    }

    /// Deliver to one session only (targeted errors).
    pub fn send_to(&self, room_code: &str, player_id: PlayerId, msg: ServerMsg) {
        if let Some(members) = self.sessions.get(room_code) {
            if let Some(recipient) = members.get(&player_id) {
                let _ = recipient.value().do_send(OutboundEvent(msg));
            }
        }
    }

    pub fn connected_count(&self, room_code: &str) -> usize {
        self.sessions
            .get(room_code)
            .map(|members| members.len())
            .unwrap_or(0)
    }
}
