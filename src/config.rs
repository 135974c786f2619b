//! Server configuration
//!
//! Loaded from `POKER_*` environment variables (and a `.env` file when present)
//! through the `config` crate, then validated.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::cards::DeckVariant;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] ::config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Unsupported deck size {0}, expected 32 or 52")]
    UnsupportedDeck(usize),
}

/// Configuration for the background reaper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long an offline member keeps its seat before being evicted
    pub member_ttl: Duration,
    /// How long a room without online members survives without activity
    pub room_ttl: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(10 * 60), // 10 minutes
            member_ttl: Duration::from_secs(60 * 60),       // 1 hour
            room_ttl: Duration::from_secs(6 * 60 * 60),     // 6 hours
        }
    }
}

/// Settings shared by every room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    pub deck_variant: DeckVariant,
    /// Delay between a join handshake and the member being admitted
    pub reconnect_grace: Duration,
    /// Room used when a client leaves the room field empty. When unset the
    /// player gets a private room named after themselves.
    pub default_room: Option<String>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            deck_variant: DeckVariant::Short,
            reconnect_grace: Duration::from_millis(10),
            default_room: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub heartbeat_interval: Duration,
    pub room: RoomConfig,
    pub cleanup: CleanupConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            heartbeat_interval: Duration::from_secs(5),
            room: RoomConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

/// Raw values as they appear in the environment, e.g. `POKER_HEARTBEAT_SECS`
/// -> `heartbeat_secs`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvSettings {
    pub bind_addr: String,
    pub heartbeat_secs: u64,
    pub reconnect_grace_ms: u64,
    pub default_room: Option<String>,
    pub deck: usize,
    pub cleanup_interval_secs: u64,
    pub member_ttl_secs: u64,
    pub room_ttl_secs: u64,
}

impl Default for EnvSettings {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind_addr: defaults.bind_addr,
            heartbeat_secs: defaults.heartbeat_interval.as_secs(),
            reconnect_grace_ms: defaults.room.reconnect_grace.as_millis() as u64,
            default_room: defaults.room.default_room,
            deck: defaults.room.deck_variant.card_count(),
            cleanup_interval_secs: defaults.cleanup.cleanup_interval.as_secs(),
            member_ttl_secs: defaults.cleanup.member_ttl.as_secs(),
            room_ttl_secs: defaults.cleanup.room_ttl.as_secs(),
        }
    }
}

impl EnvSettings {
    /// Reads `POKER_*` variables, loading `.env` first if present
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::Environment::with_prefix("POKER").ignore_empty(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Semantic checks the deserializer cannot express
    pub fn validate(&self) -> Result<(), ValidationError> {
        let durations = [
            ("POKER_HEARTBEAT_SECS", self.heartbeat_secs),
            ("POKER_RECONNECT_GRACE_MS", self.reconnect_grace_ms),
            ("POKER_CLEANUP_INTERVAL_SECS", self.cleanup_interval_secs),
            ("POKER_MEMBER_TTL_SECS", self.member_ttl_secs),
            ("POKER_ROOM_TTL_SECS", self.room_ttl_secs),
        ];
        if let Some((key, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ValidationError::ZeroDuration(*key));
        }

        DeckVariant::from_card_count(self.deck)
            .map(|_| ())
            .ok_or(ValidationError::UnsupportedDeck(self.deck))
    }

    /// Validates and converts into the typed configuration
    pub fn into_config(self) -> Result<ServerConfig, ValidationError> {
        self.validate()?;
        let deck_variant = DeckVariant::from_card_count(self.deck)
            .ok_or(ValidationError::UnsupportedDeck(self.deck))?;

        Ok(ServerConfig {
            bind_addr: self.bind_addr,
            heartbeat_interval: Duration::from_secs(self.heartbeat_secs),
            room: RoomConfig {
                deck_variant,
                reconnect_grace: Duration::from_millis(self.reconnect_grace_ms),
                default_room: self
                    .default_room
                    .map(|room| room.trim().to_string())
                    .filter(|room| !room.is_empty()),
            },
            cleanup: CleanupConfig {
                cleanup_interval: Duration::from_secs(self.cleanup_interval_secs),
                member_ttl: Duration::from_secs(self.member_ttl_secs),
                room_ttl: Duration::from_secs(self.room_ttl_secs),
            },
        })
    }
}

impl ServerConfig {
    /// Loads and validates the configuration from the environment
    pub fn load() -> Result<Self, ConfigError> {
        Ok(EnvSettings::load()?.into_config()?)
    }
}
