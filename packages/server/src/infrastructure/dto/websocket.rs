//! WebSocket message DTOs.
//!
//! Every frame is `{"event": "<name>", "data": {...}}`. Event names are
//! the ones the browser client already speaks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========================================
// Client → Server
// ========================================

/// Raw inbound frame before the event name is dispatched.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    #[serde(alias = "email")]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomJoinPayload {
    pub room: String,
    #[serde(default, alias = "email")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomPayload {
    pub room: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferPayload {
    pub to: String,
    pub offer: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerPayload {
    pub to: String,
    #[serde(alias = "ans")]
    pub answer: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePayload {
    pub to: String,
    pub candidate: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessagePayload {
    pub room: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitePayload {
    #[serde(rename = "toEmail", alias = "to")]
    pub to_email: String,
    pub room: String,
}

// ========================================
// Server → Client
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetailDto {
    pub username: String,
    pub id: String,
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "connection:ready")]
    ConnectionReady { id: String },

    #[serde(rename = "users:update")]
    UsersUpdate {
        users: Vec<String>,
        details: Vec<UserDetailDto>,
    },

    #[serde(rename = "rooms:update")]
    RoomsUpdate { rooms: Vec<String> },

    #[serde(rename = "user:joined")]
    UserJoined {
        username: Option<String>,
        id: String,
    },

    #[serde(rename = "room:join")]
    RoomJoin {
        room: String,
        username: Option<String>,
    },

    #[serde(rename = "chat:joined")]
    ChatJoined { room: String },

    #[serde(rename = "chat:message")]
    ChatMessage {
        room: String,
        from: String,
        #[serde(rename = "fromId")]
        from_id: String,
        message: String,
        /// Unix epoch milliseconds
        at: i64,
    },

    #[serde(rename = "anon:chat:count")]
    AnonChatCount { room: String, count: usize },

    #[serde(rename = "anon:chat:matched")]
    AnonChatMatched { room: String },

    #[serde(rename = "anon:video:matched")]
    AnonVideoMatched { room: String },

    #[serde(rename = "anon:chat:searching")]
    AnonChatSearching {},

    #[serde(rename = "anon:video:searching")]
    AnonVideoSearching {},

    #[serde(rename = "anon:chat:left")]
    AnonChatLeft {},

    #[serde(rename = "anon:video:left")]
    AnonVideoLeft {},

    #[serde(rename = "incomming:call")]
    IncomingCall { from: String, offer: Value },

    #[serde(rename = "call:accepted")]
    CallAccepted {
        from: String,
        answer: Value,
        /// Same payload as `answer`; older clients read this name.
        ans: Value,
    },

    #[serde(rename = "peer:nego:needed")]
    NegotiationNeeded { from: String, offer: Value },

    #[serde(rename = "peer:nego:final")]
    NegotiationFinal {
        from: String,
        answer: Value,
        ans: Value,
    },

    #[serde(rename = "ice:candidate")]
    IceCandidate { from: String, candidate: Value },

    #[serde(rename = "video:invite")]
    VideoInvite { from: String, room: String },

    #[serde(rename = "chat:invite")]
    ChatInvite { from: String, room: String },
}

impl ServerMessage {
    /// Wire name of the event, as carried in the `event` field.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ConnectionReady { .. } => "connection:ready",
            Self::UsersUpdate { .. } => "users:update",
            Self::RoomsUpdate { .. } => "rooms:update",
            Self::UserJoined { .. } => "user:joined",
            Self::RoomJoin { .. } => "room:join",
            Self::ChatJoined { .. } => "chat:joined",
            Self::ChatMessage { .. } => "chat:message",
            Self::AnonChatCount { .. } => "anon:chat:count",
            Self::AnonChatMatched { .. } => "anon:chat:matched",
            Self::AnonVideoMatched { .. } => "anon:video:matched",
            Self::AnonChatSearching {} => "anon:chat:searching",
            Self::AnonVideoSearching {} => "anon:video:searching",
            Self::AnonChatLeft {} => "anon:chat:left",
            Self::AnonVideoLeft {} => "anon:video:left",
            Self::IncomingCall { .. } => "incomming:call",
            Self::CallAccepted { .. } => "call:accepted",
            Self::NegotiationNeeded { .. } => "peer:nego:needed",
            Self::NegotiationFinal { .. } => "peer:nego:final",
            Self::IceCandidate { .. } => "ice:candidate",
            Self::VideoInvite { .. } => "video:invite",
            Self::ChatInvite { .. } => "chat:invite",
        }
    }
}
