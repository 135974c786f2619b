use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use polish_poker::{
    config::RoomConfig, websockets::ClientSession, DeckVariant, RoomDirectory,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_GRACE: Duration = Duration::from_millis(10);

pub struct TestSetup {
    pub directory: Arc<RoomDirectory>,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    /// (connection id, player name) of the connections opened by the builder
    pub players: Vec<(String, String)>,
    pub room_name: String,
    pub(super) sessions: Mutex<HashMap<String, ClientSession>>,
    pub(super) next_connection: Mutex<usize>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    room_name: String,
    deck_variant: DeckVariant,
    default_room: Option<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            room_name: "Public".to_string(),
            deck_variant: DeckVariant::Short,
            default_room: None,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["Alice", "Bob"])
    }

    pub fn with_full_deck(mut self) -> Self {
        self.deck_variant = DeckVariant::Full;
        self
    }

    pub fn with_default_room(mut self, room_name: &str) -> Self {
        self.default_room = Some(room_name.to_string());
        self
    }

    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let config = RoomConfig {
            deck_variant: self.deck_variant,
            reconnect_grace: TEST_GRACE,
            default_room: self.default_room,
        };
        let directory = Arc::new(RoomDirectory::new(mock_conn_manager.clone(), config));

        let setup = TestSetup {
            directory,
            mock_conn_manager,
            players: Vec::new(),
            room_name: self.room_name,
            sessions: Mutex::new(HashMap::new()),
            next_connection: Mutex::new(0),
        };

        let mut players = Vec::new();
        for name in self.players {
            let connection_id = setup.open_connection().await;
            players.push((connection_id, name));
        }

        TestSetup { players, ..setup }
    }
}
