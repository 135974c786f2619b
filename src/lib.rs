// Library crate for the Polish Poker card-dealing server
// This file exposes the public API for integration tests

pub mod cards;
pub mod config;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use cards::{Card, DeckVariant, Rank, Suit};
pub use crate::config::{CleanupConfig, RoomConfig, ServerConfig};
pub use room::{Room, RoomDirectory};
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientSession, ConnectionManager, MessageHandler, MessageType, WebSocketMessage,
};
