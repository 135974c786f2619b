use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::messages::ClientMessage;
use super::socket::MessageHandler;
use crate::room::{Room, RoomDirectory};

/// Routes the frames of one connection: the first JOIN binds it to a room,
/// everything after goes to that room
pub struct ClientSession {
    connection_id: String,
    directory: Arc<RoomDirectory>,
    room: Option<Arc<Room>>,
}

impl ClientSession {
    pub fn new(connection_id: String, directory: Arc<RoomDirectory>) -> Self {
        Self {
            connection_id,
            directory,
            room: None,
        }
    }

    /// Name given to a client that joins without one
    pub fn fallback_name(connection_id: &str) -> String {
        connection_id.chars().take(8).collect()
    }

    pub fn room(&self) -> Option<&Arc<Room>> {
        self.room.as_ref()
    }

    async fn join(&mut self, name: Option<String>, room: Option<String>) {
        if self.room.is_some() {
            debug!(connection_id = %self.connection_id, "Already joined, ignoring JOIN");
            return;
        }

        let name = name.unwrap_or_else(|| Self::fallback_name(&self.connection_id));
        let room = self
            .directory
            .join(room.as_deref(), &name, &self.connection_id)
            .await;
        info!(
            connection_id = %self.connection_id,
            player = %name,
            room = %room.name(),
            "Join handshake received"
        );
        self.room = Some(room);
    }

    async fn dispatch(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::Join { name, room } => self.join(name, room).await,
            other => self.forward(other).await,
        }
    }

    async fn forward(&self, message: ClientMessage) {
        let Some(room) = self.room.as_ref() else {
            debug!(connection_id = %self.connection_id, "Frame before JOIN, ignoring");
            return;
        };
        if !room.is_member(&self.connection_id).await {
            debug!(connection_id = %self.connection_id, "Not admitted yet, ignoring frame");
            return;
        }

        match message {
            ClientMessage::Show => room.show_cards().await,
            ClientMessage::NextRound => room.next_round().await,
            ClientMessage::NextCards { count } => {
                room.set_card_count(&self.connection_id, count).await
            }
            ClientMessage::Join { .. } => {}
        }
    }
}

#[async_trait]
impl MessageHandler for ClientSession {
    #[instrument(skip(self, message), fields(connection_id = %self.connection_id))]
    async fn handle_message(&mut self, message: String) {
        match ClientMessage::parse(&message) {
            Ok(Some(parsed)) => self.dispatch(parsed).await,
            Ok(None) => debug!(message = %message, "Ignoring unsupported message type"),
            Err(e) => debug!(error = %e, "Failed to parse WebSocket message"),
        }
    }

    async fn handle_close(&mut self) {
        if let Some(room) = self.room.take() {
            room.disconnect(&self.connection_id).await;
        }
    }
}
