use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

pub const CLIENT_VERSION: &str = "0.1";
pub const DEFAULT_NPC_NAME: &str = "NPC";
pub const DEFAULT_CHAT_SENDER: &str = "Unknown";

/// Discriminators the client knows how to decode
pub const INBOUND_TYPES: [&str; 4] = [
    "world_update",
    "chat_message",
    "event_notification",
    "connection_ack",
];

pub type Position = (i32, i32);
pub type Dimensions = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A user- or system-originated action bound for the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    Chat(String),
    InteractNearby,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeInfo {
    pub nickname: String,
    pub client_version: String,
}

/// Client to server messages, tagged by `action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundMessage {
    ClientHello {
        nickname: String,
        client_version: String,
    },
    Move {
        direction: Direction,
    },
    Chat {
        message: String,
    },
    InteractNearby,
    ClientDisconnecting,
}

impl From<&Intent> for OutboundMessage {
    fn from(intent: &Intent) -> Self {
        match intent {
            Intent::Move(direction) => OutboundMessage::Move {
                direction: *direction,
            },
            Intent::Chat(message) => OutboundMessage::Chat {
                message: message.clone(),
            },
            Intent::InteractNearby => OutboundMessage::InteractNearby,
            Intent::Disconnect => OutboundMessage::ClientDisconnecting,
        }
    }
}

impl From<&HandshakeInfo> for OutboundMessage {
    fn from(info: &HandshakeInfo) -> Self {
        OutboundMessage::ClientHello {
            nickname: info.nickname.clone(),
            client_version: info.client_version.clone(),
        }
    }
}

/// Server to client messages, tagged by `type`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    WorldUpdate(WorldUpdate),
    ChatMessage(ChatMessage),
    EventNotification(EventNotification),
    ConnectionAck(ConnectionAck),
}

/// An absent scalar field leaves the local value untouched; an absent roster
/// is an empty roster, since every update carries the full set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorldUpdate {
    #[serde(default)]
    pub my_pos: Option<Position>,
    #[serde(default)]
    pub map_id: Option<String>,
    #[serde(default)]
    pub map_dimensions: Option<Dimensions>,
    #[serde(default)]
    pub other_players: Vec<PlayerEntry>,
    #[serde(default)]
    pub npcs: Vec<NpcEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerEntry {
    pub id: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NpcEntry {
    pub id: String,
    pub pos: Position,
    #[serde(default = "default_npc_name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMessage {
    #[serde(default = "default_chat_sender")]
    pub sender: String,
    #[serde(default)]
    pub message: String,
}

// Carried through decode but not applied to any local state yet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventNotification {
    #[serde(flatten)]
    pub payload: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionAck {
    #[serde(default)]
    pub your_id: Option<String>,
}

fn default_npc_name() -> String {
    DEFAULT_NPC_NAME.to_string()
}

fn default_chat_sender() -> String {
    DEFAULT_CHAT_SENDER.to_string()
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("message has no string `type` discriminator")]
    MissingType,
    #[error("unrecognized message type `{0}`")]
    UnknownType(String),
    #[error("invalid `{kind}` payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
#[error("failed to encode outbound message: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Decodes one inbound text frame
pub fn decode(raw: &str) -> Result<InboundMessage, DecodeError> {
    let value: Value = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_string();

    if !INBOUND_TYPES.contains(&kind.as_str()) {
        return Err(DecodeError::UnknownType(kind));
    }

    serde_json::from_value(value).map_err(|source| DecodeError::InvalidPayload { kind, source })
}

/// Encodes one outbound text frame
pub fn encode(message: &OutboundMessage) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(message)?)
}

pub fn encode_intent(intent: &Intent) -> Result<String, EncodeError> {
    encode(&OutboundMessage::from(intent))
}

pub fn encode_handshake(info: &HandshakeInfo) -> Result<String, EncodeError> {
    encode(&OutboundMessage::from(info))
}
