//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use polish_poker::{
    websockets::{MessageType, RosterEntry, WebSocketMessage},
    Card,
};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    connections: Vec<String>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for every connection opened by the builder
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let connections = setup.players.iter().map(|p| p.0.clone()).collect();
        Self { setup, connections }
    }

    /// Create an assertion for specific connections
    pub fn for_connections(setup: &'a TestSetup, connections: Vec<&str>) -> Self {
        let connections = connections.into_iter().map(str::to_string).collect();
        Self { setup, connections }
    }

    /// Assert that every connection received a specific message type next
    /// (consumes the message from the queue)
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for connection in &self.connections {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(connection)
                .await;
            let message =
                message.unwrap_or_else(|| panic!("{} should have received a message", connection));

            let msg: WebSocketMessage = serde_json::from_str(&message).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                connection
            );
            messages.push(msg);
        }

        // Hands differ per player, everything else is a broadcast
        if messages.len() > 1 && expected_type != MessageType::Deck {
            let first_payload = &messages[0].payload;
            for (i, msg) in messages.iter().enumerate().skip(1) {
                assert_eq!(
                    &msg.payload, first_payload,
                    "{} payload differs from {}",
                    self.connections[i], self.connections[0]
                );
            }
        }

        MessageContent {
            message: messages.swap_remove(0),
        }
    }

    /// Assert that connections have no unread messages
    pub async fn received_no_messages(self) {
        for connection in &self.connections {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(connection)
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                connection,
                messages
            );
        }
    }

    /// Assert that each connection's unread messages start with the given
    /// types (consumes them). Returns the first connection's messages.
    pub async fn received_message_sequence(
        self,
        expected_types: Vec<MessageType>,
    ) -> Vec<MessageContent> {
        let mut result_messages = vec![];

        for (index, connection) in self.connections.iter().enumerate() {
            for (i, expected_type) in expected_types.iter().enumerate() {
                let raw = self
                    .setup
                    .mock_conn_manager
                    .consume_message_for(connection)
                    .await
                    .unwrap_or_else(|| {
                        panic!(
                            "{} should have received {} messages, but only got {}",
                            connection,
                            expected_types.len(),
                            i
                        )
                    });
                let msg: WebSocketMessage = serde_json::from_str(&raw).unwrap_or_else(|e| {
                    panic!("Failed to parse message {} for {}: {}", i, connection, e)
                });

                assert_eq!(
                    msg.message_type, *expected_type,
                    "{} message {} has wrong type: expected {:?}, got {:?}",
                    connection, i, expected_type, msg.message_type
                );

                // Only collect messages from the first connection to avoid duplicates
                if index == 0 {
                    result_messages.push(MessageContent { message: msg });
                }
            }
        }

        result_messages
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    message: WebSocketMessage,
}

impl MessageContent {
    /// Cards of a DECK message
    pub fn hand(&self) -> Vec<Card> {
        self.message.deck_cards().expect("DECK payload")
    }

    /// Groups of a SHOW message
    pub fn groups(&self) -> Vec<Vec<Card>> {
        self.message.shown_cards().expect("SHOW payload")
    }

    /// Assert a DECK message carries `expected` cards
    pub fn with_hand_size(self, expected: usize) -> Self {
        assert_eq!(self.hand().len(), expected);
        self
    }

    /// Assert a SHOW message carries `expected` cards across all groups
    pub fn with_shown_total(self, expected: usize) -> Self {
        let total: usize = self.groups().iter().map(Vec::len).sum();
        assert_eq!(total, expected);
        self
    }

    /// Assert a CLIENTS message matches the given roster exactly
    pub fn with_roster(self, expected: &[(&str, RosterEntry)]) -> Self {
        let roster = self.message.roster().expect("CLIENTS payload");
        let expected: Vec<(String, RosterEntry)> = expected
            .iter()
            .map(|(name, entry)| (name.to_string(), entry.clone()))
            .collect();
        let actual: Vec<(String, RosterEntry)> = roster.into_iter().collect();
        assert_eq!(actual, expected);
        self
    }
}
