use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::models::{Member, RoundState};
use super::state::{Outbound, RoomState};
use crate::config::{CleanupConfig, RoomConfig};
use crate::websockets::{ConnectionManager, Roster};

/// A join that is waiting out the grace window
struct PendingAdmission {
    connection_id: String,
    task: JoinHandle<()>,
}

/// What a reaper pass did to one room
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomSweep {
    pub evicted_members: Vec<String>,
    pub dormant: bool,
}

/// A live room: serializes access to its state and delivers the frames each
/// transition produces.
///
/// Lock order is `pending` then `state`.
pub struct Room {
    name: String,
    state: Mutex<RoomState>,
    // display name -> admission waiting for its grace window
    pending: Mutex<HashMap<String, PendingAdmission>>,
    connection_manager: Arc<dyn ConnectionManager>,
    reconnect_grace: Duration,
}

impl Room {
    pub fn new(
        name: String,
        config: &RoomConfig,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            state: Mutex::new(RoomState::new(name.clone(), config.deck_variant, Utc::now())),
            name,
            pending: Mutex::new(HashMap::new()),
            connection_manager,
            reconnect_grace: config.reconnect_grace,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schedules admission of `connection_id` as `player_name` once the grace
    /// window passes. A newer join under the same name replaces this one.
    #[instrument(skip(self), fields(room = %self.name))]
    pub async fn admit(self: &Arc<Self>, connection_id: String, player_name: String) {
        let mut pending = self.pending.lock().await;

        if let Some(previous) = pending.remove(&player_name) {
            previous.task.abort();
            warn!(
                superseded = %previous.connection_id,
                "Duplicate join within grace window, keeping the latest"
            );
            self.connection_manager
                .remove_connection(&previous.connection_id)
                .await;
        }

        let room = Arc::clone(self);
        let grace = self.reconnect_grace;
        let (task_connection, task_name) = (connection_id.clone(), player_name.clone());
        let task = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            room.complete_admission(&task_connection, &task_name).await;
        });

        debug!(grace_ms = grace.as_millis() as u64, "Admission scheduled");
        pending.insert(
            player_name,
            PendingAdmission {
                connection_id,
                task,
            },
        );
    }

    async fn complete_admission(&self, connection_id: &str, player_name: &str) {
        let mut pending = self.pending.lock().await;
        match pending.get(player_name) {
            Some(entry) if entry.connection_id == connection_id => {
                pending.remove(player_name);
            }
            _ => {
                debug!(room = %self.name, connection_id = %connection_id, "Admission no longer pending");
                return;
            }
        }

        let mut state = self.state.lock().await;
        let admission = state.admit(connection_id, player_name, Utc::now());
        self.deliver(admission.outbound).await;
        drop(state);
        drop(pending);

        if let Some(replaced) = admission.replaced_connection {
            debug!(room = %self.name, replaced = %replaced, "Closing replaced transport");
            self.connection_manager.remove_connection(&replaced).await;
        }
    }

    /// Deals a new round if none is active
    #[instrument(skip(self), fields(room = %self.name))]
    pub async fn next_round(&self) {
        let mut state = self.state.lock().await;
        let outbound = state.next_round(&mut rand::rng(), Utc::now());
        self.deliver(outbound).await;
    }

    /// Reveals the current deal to everybody
    #[instrument(skip(self), fields(room = %self.name))]
    pub async fn show_cards(&self) {
        let mut state = self.state.lock().await;
        let outbound = state.show_cards(Utc::now());
        self.deliver(outbound).await;
    }

    #[instrument(skip(self), fields(room = %self.name))]
    pub async fn set_card_count(&self, connection_id: &str, count: Option<usize>) {
        let mut state = self.state.lock().await;
        let outbound = state.set_card_count(connection_id, count, Utc::now());
        self.deliver(outbound).await;
    }

    /// Handles a closed transport, whether it was admitted yet or not
    #[instrument(skip(self), fields(room = %self.name))]
    pub async fn disconnect(&self, connection_id: &str) {
        let mut pending = self.pending.lock().await;
        pending.retain(|name, entry| {
            if entry.connection_id != connection_id {
                return true;
            }
            entry.task.abort();
            info!(player = %name, "Transport closed before admission");
            false
        });

        let mut state = self.state.lock().await;
        let outbound = state.disconnect(connection_id, Utc::now());
        self.deliver(outbound).await;
    }

    pub async fn has_pending(&self) -> bool {
        !self.pending.lock().await.is_empty()
    }

    /// Whether `connection_id` is the live transport of an admitted member
    pub async fn is_member(&self, connection_id: &str) -> bool {
        self.state
            .lock()
            .await
            .member_by_connection(connection_id)
            .is_some_and(Member::is_online)
    }

    pub async fn members(&self) -> Vec<Member> {
        self.state.lock().await.members().to_vec()
    }

    pub async fn roster(&self) -> Roster {
        self.state.lock().await.roster()
    }

    pub async fn round(&self) -> RoundState {
        self.state.lock().await.round()
    }

    /// Evicts long-offline members and reports whether the room can be dropped
    pub async fn sweep(&self, now: DateTime<Utc>, config: &CleanupConfig) -> RoomSweep {
        let pending = self.pending.lock().await;
        let mut state = self.state.lock().await;

        let evicted_members = state.evict_offline_members(now, config.member_ttl);
        let dormant = pending.is_empty() && state.is_dormant(now, config.room_ttl);
        RoomSweep {
            evicted_members,
            dormant,
        }
    }

    async fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound {
            connection_id,
            message,
        } in outbound
        {
            let payload = match message.to_json() {
                Ok(payload) => payload,
                Err(e) => {
                    error!(room = %self.name, error = %e, "Failed to encode message");
                    continue;
                }
            };

            if let Err(e) = self
                .connection_manager
                .send_to_connection(&connection_id, &payload)
                .await
            {
                warn!(
                    room = %self.name,
                    message_type = %message.message_type,
                    error = %e,
                    "Failed to deliver message"
                );
            }
        }
    }
}
