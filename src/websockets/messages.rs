use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use strum_macros::{Display, FromRepr};
use thiserror::Error;

use crate::cards::Card;

/// Message kinds, sent on the wire as the integer `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum MessageType {
    // Server -> Client
    Deck = 0,
    // Client -> Server
    Join = 1,
    // Both directions: clients request a reveal, the server broadcasts it
    Show = 2,
    // Client -> Server
    NextRound = 3,
    NextCards = 4,
    // Server -> Client
    Clients = 5,
    // Reserved
    Rooms = 6,
}

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        MessageType::from_repr(value)
            .ok_or_else(|| de::Error::custom(format!("unknown message type {}", value)))
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Frame has no integer type field")]
    MissingType,
}

/// Card count shown in the roster: the requested number, or a placeholder when
/// the member is offline or asked for something that is not a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RosterEntry {
    Count(usize),
    Placeholder(String),
}

impl RosterEntry {
    pub const PLACEHOLDER: &'static str = "-";

    pub fn placeholder() -> Self {
        RosterEntry::Placeholder(Self::PLACEHOLDER.to_string())
    }
}

pub type Roster = BTreeMap<String, RosterEntry>;

/// One frame on the wire: `{"type": <kind>, ...payload fields}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            payload: Map::new(),
        }
    }

    fn with_field(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    /// Create a DECK message carrying one member's hand
    pub fn deck(cards: &[Card]) -> Self {
        Self::new(MessageType::Deck).with_field("deck", serde_json::json!(cards))
    }

    /// Create a SHOW message carrying the grouped whole-pool
    pub fn show(groups: &[Vec<Card>]) -> Self {
        Self::new(MessageType::Show).with_field("cards", serde_json::json!(groups))
    }

    /// Create a CLIENTS message with the roster
    pub fn clients(roster: &Roster) -> Self {
        Self::new(MessageType::Clients).with_field("clients", serde_json::json!(roster))
    }

    /// Create a JOIN message (client side)
    pub fn join(name: &str, room: &str) -> Self {
        Self::new(MessageType::Join)
            .with_field("name", Value::from(name))
            .with_field("room", Value::from(room))
    }

    /// Create a NEXT_CARDS message (client side)
    pub fn next_cards(count: usize) -> Self {
        Self::new(MessageType::NextCards).with_field("count", Value::from(count))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Cards in a DECK payload
    pub fn deck_cards(&self) -> Option<Vec<Card>> {
        self.payload
            .get("deck")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Groups in a SHOW payload
    pub fn shown_cards(&self) -> Option<Vec<Vec<Card>>> {
        self.payload
            .get("cards")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Roster in a CLIENTS payload
    pub fn roster(&self) -> Option<Roster> {
        self.payload
            .get("clients")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Inbound frames the server acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Join {
        name: Option<String>,
        room: Option<String>,
    },
    Show,
    NextRound,
    NextCards {
        count: Option<usize>,
    },
}

impl ClientMessage {
    /// Decodes a text frame. Kinds the server does not accept return `Ok(None)`.
    pub fn parse(text: &str) -> Result<Option<Self>, ProtocolError> {
        let frame: Value = serde_json::from_str(text)?;
        let kind = frame
            .get("type")
            .and_then(Value::as_u64)
            .ok_or(ProtocolError::MissingType)?;

        let Some(kind) = u8::try_from(kind).ok().and_then(MessageType::from_repr) else {
            return Ok(None);
        };

        let message = match kind {
            MessageType::Join => ClientMessage::Join {
                name: non_blank(frame.get("name")),
                room: non_blank(frame.get("room")),
            },
            MessageType::Show => ClientMessage::Show,
            MessageType::NextRound => ClientMessage::NextRound,
            MessageType::NextCards => ClientMessage::NextCards {
                count: frame.get("count").and_then(parse_count),
            },
            MessageType::Deck | MessageType::Clients | MessageType::Rooms => return Ok(None),
        };

        Ok(Some(message))
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts non-negative integers and numeric strings
fn parse_count(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
