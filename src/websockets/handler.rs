use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use super::router::ClientSession;
use super::socket::{Connection, SocketWrapper};
use crate::shared::AppState;

/// WebSocket endpoint. Clients identify themselves with a JOIN frame after
/// the upgrade.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    ws.on_upgrade(move |socket| serve_connection(Box::new(socket), app_state))
}

/// Runs one upgraded transport until it closes
pub async fn serve_connection(socket: Box<dyn SocketWrapper>, app_state: AppState) {
    let connection_id = Uuid::new_v4().to_string();
    info!(connection_id = %connection_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let session = ClientSession::new(connection_id.clone(), app_state.directory.clone());
    let connection = Connection::new(
        connection_id.clone(),
        socket,
        outbound_receiver,
        Box::new(session),
        app_state.config.heartbeat_interval,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => info!(connection_id = %connection_id, "WebSocket connection closed cleanly"),
        Err(e) => warn!(connection_id = %connection_id, error = %e, "WebSocket connection error"),
    }

    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
}
