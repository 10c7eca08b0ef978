use std::sync::Arc;

use crate::services::rooms::RoomService;
use crate::ws::hub::RoomHub;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Room orchestration (registry, round engine, generation).
    pub rooms: Arc<RoomService>,
    /// Fan-out registry for connected sessions.
    pub hub: Arc<RoomHub>,
}

impl AppState {
    pub fn new(rooms: Arc<RoomService>, hub: Arc<RoomHub>) -> Self {
        Self { rooms, hub }
    }

    /// Offline state for tests: canned generation, two-round games.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        use crate::generation::OfflineGenerator;
        use crate::services::registry::RoomRegistry;

        let rooms = RoomService::new(Arc::new(RoomRegistry::new()), Arc::new(OfflineGenerator), 2);
        Self::new(Arc::new(rooms), Arc::new(RoomHub::new()))
    }
}
