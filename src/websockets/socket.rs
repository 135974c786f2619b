use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// What the transport handed us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Text(String),
    Pong,
    /// Binary frames and client pings, which the server does not act on
    Ignored,
}

/// Simple WebSocket abstraction - all we care about is send/receive and liveness
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Send a heartbeat ping
    async fn send_ping(&mut self) -> Result<(), SocketError>;

    /// Receive the next event from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<SocketEvent>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for the inbound side of one connection
#[async_trait]
pub trait MessageHandler: Send {
    /// Handle an incoming text frame from the client
    async fn handle_message(&mut self, message: String);

    /// Called exactly once, after the connection has stopped
    async fn handle_close(&mut self);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("No heartbeat response")]
    HeartbeatTimeout,
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn send_ping(&mut self) -> Result<(), SocketError> {
        self.send(Message::Ping(Vec::new()))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<SocketEvent>, SocketError> {
        match self.recv().await {
            Some(Ok(Message::Text(text))) => Ok(Some(SocketEvent::Text(text))),
            Some(Ok(Message::Pong(_))) => Ok(Some(SocketEvent::Pong)),
            Some(Ok(Message::Close(_))) => Ok(None),
            Some(Ok(_)) => Ok(Some(SocketEvent::Ignored)),
            Some(Err(e)) => Err(SocketError::ReceiveFailed(e.to_string())),
            None => Ok(None), // Connection closed
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Connection represents a managed WebSocket connection
/// It is used to send and receive messages to and from the client
/// The outbound receiver is a channel that receives messages from the ConnectionManager's outbound sender
pub struct Connection {
    pub connection_id: String,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Box<dyn MessageHandler>,
    heartbeat_interval: Duration,
}

impl Connection {
    pub fn new(
        connection_id: String,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Box<dyn MessageHandler>,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound_receiver,
            message_handler,
            heartbeat_interval,
        }
    }

    /// Run the connection - handles sending, receiving and the heartbeat until
    /// disconnect. The handler's close hook runs once however the loop ends.
    pub async fn run(mut self) -> Result<(), SocketError> {
        let mut heartbeat = interval(self.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        heartbeat.tick().await;
        let mut alive = true;

        let result = loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !alive {
                        warn!(connection_id = %self.connection_id, "Heartbeat missed, terminating connection");
                        break Err(SocketError::HeartbeatTimeout);
                    }
                    alive = false;
                    if let Err(e) = self.socket.send_ping().await {
                        break Err(e);
                    }
                }

                // Handle outbound messages (from our app to client)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => {
                            if let Err(e) = self.socket.send_message(message).await {
                                break Err(e);
                            }
                        }
                        None => break Ok(()), // Channel closed, disconnect
                    }
                }

                // Handle inbound messages (from client to our app)
                event = self.socket.receive_message() => {
                    match event {
                        Ok(Some(SocketEvent::Text(message))) => {
                            alive = true;
                            self.message_handler.handle_message(message).await;
                        }
                        Ok(Some(SocketEvent::Pong)) => alive = true,
                        Ok(Some(SocketEvent::Ignored)) => {
                            debug!(connection_id = %self.connection_id, "Ignoring non-text frame");
                        }
                        Ok(None) => break Ok(()), // Client disconnected
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        self.message_handler.handle_close().await;

        // Clean disconnect
        let _ = self.socket.close().await;
        result
    }
}
