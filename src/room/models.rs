use chrono::{DateTime, Utc};

use crate::cards::Card;

/// Round lifecycle of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundState {
    /// No unrevealed deal is outstanding
    #[default]
    RoundEnded,
    /// Cards were dealt and not yet shown
    RoundActive,
}

/// One participant of a room: a stable identity plus the transport currently
/// bound to it
#[derive(Debug, Clone)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub connection_id: String,
    /// `None` when the client asked for something that is not a number
    pub requested_count: Option<usize>,
    pub hand: Vec<Card>,
    pub offline_since: Option<DateTime<Utc>>,
}

impl Member {
    pub const DEFAULT_CARD_COUNT: usize = 1;

    pub fn new(id: String, name: String, connection_id: String) -> Self {
        Self {
            id,
            name,
            connection_id,
            requested_count: Some(Self::DEFAULT_CARD_COUNT),
            hand: Vec::new(),
            offline_since: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.offline_since.is_none()
    }

    /// Whether the member has been offline for at least `ttl`
    pub fn offline_longer_than(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        match self.offline_since {
            Some(since) => (now - since).to_std().map(|d| d >= ttl).unwrap_or(false),
            None => false,
        }
    }
}
