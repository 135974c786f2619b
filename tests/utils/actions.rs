#![allow(dead_code)] // Test utilities may not all be used in every test

use std::sync::Arc;
use tokio::time::{sleep, Duration};

use polish_poker::{
    room::Room,
    websockets::{ClientSession, ConnectionManager, MessageHandler, MessageType, WebSocketMessage},
};

use super::setup::{TestSetup, TEST_GRACE};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Opens a new transport and returns its connection id
    pub async fn open_connection(&self) -> String {
        let mut next = self.next_connection.lock().await;
        *next += 1;
        let connection_id = format!("conn-{:04}-0000-4000-8000-000000000000", *next);

        self.mock_conn_manager.connect(&connection_id).await;
        self.sessions.lock().await.insert(
            connection_id.clone(),
            ClientSession::new(connection_id.clone(), self.directory.clone()),
        );
        connection_id
    }

    /// Connection id of a player opened by the builder
    pub fn connection_of(&self, name: &str) -> String {
        self.players
            .iter()
            .find(|(_, player)| player == name)
            .map(|(connection_id, _)| connection_id.clone())
            .unwrap_or_else(|| panic!("no player named {}", name))
    }

    /// Send a raw text frame and wait for processing
    pub async fn send_raw(&self, connection_id: &str, text: &str) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(connection_id)
            .unwrap_or_else(|| panic!("no open connection {}", connection_id));
        session.handle_message(text.to_string()).await;
        drop(sessions);
        sleep(Duration::from_millis(10)).await;
    }

    /// Send a WebSocket message and wait for processing
    pub async fn send_message(&self, connection_id: &str, message: WebSocketMessage) {
        let json = serde_json::to_string(&message).unwrap();
        self.send_raw(connection_id, &json).await;
    }

    /// Closes a transport the way the socket loop does
    pub async fn close(&self, connection_id: &str) {
        let session = self.sessions.lock().await.remove(connection_id);
        if let Some(mut session) = session {
            session.handle_close().await;
        }
        self.mock_conn_manager.remove_connection(connection_id).await;
        sleep(Duration::from_millis(10)).await;
    }

    /// Waits until every scheduled admission has completed
    pub async fn wait_for_admissions(&self) {
        sleep(TEST_GRACE * 5).await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    pub async fn room(&self) -> Arc<Room> {
        self.directory
            .get(&self.room_name)
            .await
            .expect("room should exist")
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_join(&self, connection_id: &str, name: &str) {
        let room_name = self.room_name.clone();
        self.send_message(connection_id, WebSocketMessage::join(name, &room_name))
            .await;
    }

    /// Opens a fresh transport for `name` and joins with it
    pub async fn rejoin(&self, name: &str) -> String {
        let connection_id = self.open_connection().await;
        self.send_join(&connection_id, name).await;
        self.wait_for_admissions().await;
        connection_id
    }

    pub async fn send_next_round(&self, connection_id: &str) {
        self.send_message(connection_id, WebSocketMessage::new(MessageType::NextRound))
            .await;
    }

    pub async fn send_show(&self, connection_id: &str) {
        self.send_message(connection_id, WebSocketMessage::new(MessageType::Show))
            .await;
    }

    pub async fn send_next_cards(&self, connection_id: &str, count: usize) {
        self.send_message(connection_id, WebSocketMessage::next_cards(count))
            .await;
    }
}
