use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("No open connection {0}")]
    UnknownConnection(String),

    #[error("Connection {0} is closed")]
    ChannelClosed(String),
}

/// Outbound side of every open transport, keyed by connection id.
///
/// Removing a connection drops its sender, which ends that connection's
/// run loop and closes the socket.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, connection_id: &str);

    async fn send_to_connection(&self, connection_id: &str, message: &str)
        -> Result<(), DeliveryError>;
}

pub struct InMemoryConnectionManager {
    // connection id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: &str) {
        let mut connections = self.connections.write().await;
        connections.remove(connection_id);
    }

    async fn send_to_connection(
        &self,
        connection_id: &str,
        message: &str,
    ) -> Result<(), DeliveryError> {
        let connections = self.connections.read().await;
        let sender = connections
            .get(connection_id)
            .ok_or_else(|| DeliveryError::UnknownConnection(connection_id.to_string()))?;

        sender
            .send(message.to_string())
            .map_err(|_| DeliveryError::ChannelClosed(connection_id.to_string()))
    }
}
