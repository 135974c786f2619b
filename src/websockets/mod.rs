// Public API
pub use connection_manager::{ConnectionManager, DeliveryError, InMemoryConnectionManager};
pub use handler::{serve_connection, websocket_handler};
pub use messages::{
    ClientMessage, MessageType, ProtocolError, Roster, RosterEntry, WebSocketMessage,
};
pub use router::ClientSession;
pub use socket::{Connection, MessageHandler, SocketError, SocketEvent, SocketWrapper};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod router;
mod socket;
