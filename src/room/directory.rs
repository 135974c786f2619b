use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::service::Room;
use crate::config::{CleanupConfig, RoomConfig};
use crate::websockets::ConnectionManager;

/// Totals from one reaper pass over the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReapSummary {
    pub evicted_members: usize,
    pub removed_rooms: usize,
}

/// Registry of live rooms, keyed by lower-cased room name
pub struct RoomDirectory {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    connection_manager: Arc<dyn ConnectionManager>,
    config: RoomConfig,
}

impl RoomDirectory {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, config: RoomConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            connection_manager,
            config,
        }
    }

    /// Picks the room for a join: the requested room, else the configured
    /// default, else a room named after the player
    pub fn resolve_room_name(&self, requested: Option<&str>, player_name: &str) -> String {
        requested
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or(self.config.default_room.as_deref())
            .unwrap_or(player_name)
            .to_string()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Room>> {
        self.rooms.read().await.get(&name.to_lowercase()).cloned()
    }

    /// Returns the room called `name` in any casing, creating it on first use
    pub async fn get_or_create(&self, name: &str) -> Arc<Room> {
        let mut rooms = self.rooms.write().await;
        self.get_or_create_locked(&mut rooms, name)
    }

    fn get_or_create_locked(&self, rooms: &mut HashMap<String, Arc<Room>>, name: &str) -> Arc<Room> {
        rooms
            .entry(name.to_lowercase())
            .or_insert_with(|| {
                info!(room = %name, "Creating room");
                Arc::new(Room::new(
                    name.to_string(),
                    &self.config,
                    self.connection_manager.clone(),
                ))
            })
            .clone()
    }

    /// Resolves the room for a handshake and schedules the admission. Runs
    /// under the write lock so the reaper cannot drop the room in between.
    #[instrument(skip(self))]
    pub async fn join(
        &self,
        requested_room: Option<&str>,
        player_name: &str,
        connection_id: &str,
    ) -> Arc<Room> {
        let room_name = self.resolve_room_name(requested_room, player_name);
        let mut rooms = self.rooms.write().await;
        let room = self.get_or_create_locked(&mut rooms, &room_name);
        room.admit(connection_id.to_string(), player_name.to_string())
            .await;
        room
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn room_names(&self) -> Vec<String> {
        let rooms = self.rooms.read().await;
        let mut names: Vec<String> = rooms.values().map(|r| r.name().to_string()).collect();
        names.sort();
        names
    }

    /// Evicts long-offline members everywhere and drops dormant rooms
    #[instrument(skip(self, config))]
    pub async fn reap(&self, now: DateTime<Utc>, config: &CleanupConfig) -> ReapSummary {
        let mut rooms = self.rooms.write().await;
        let mut summary = ReapSummary::default();
        let mut dormant = Vec::new();

        for (key, room) in rooms.iter() {
            let sweep = room.sweep(now, config).await;
            summary.evicted_members += sweep.evicted_members.len();
            if sweep.dormant {
                dormant.push(key.clone());
            }
        }

        for key in dormant {
            if let Some(room) = rooms.remove(&key) {
                debug!(room = %room.name(), "Removed dormant room");
                summary.removed_rooms += 1;
            }
        }

        summary
    }
}
