use std::sync::Arc;
use thiserror::Error;

use crate::config::{ConfigError, ServerConfig};
use crate::room::RoomDirectory;
use crate::websockets::{ConnectionManager, InMemoryConnectionManager};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<RoomDirectory>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        directory: Arc<RoomDirectory>,
        connection_manager: Arc<dyn ConnectionManager>,
        config: ServerConfig,
    ) -> Self {
        Self {
            directory,
            connection_manager,
            config: Arc::new(config),
        }
    }

    /// Wires an in-memory connection manager and an empty directory
    pub fn from_config(config: ServerConfig) -> Self {
        let connection_manager: Arc<dyn ConnectionManager> =
            Arc::new(InMemoryConnectionManager::new());
        let directory = Arc::new(RoomDirectory::new(
            connection_manager.clone(),
            config.room.clone(),
        ));
        Self::new(directory, connection_manager, config)
    }
}

/// Failures that stop the server from starting
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
