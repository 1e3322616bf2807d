//! Value objects of the relay domain.
//!
//! Every string that crosses the wire is trimmed and validated here; an
//! instance of these types is always well-formed.

use std::fmt;

use serde_json::Value;

use super::error::ValueObjectError;

/// Name of the singleton room shared by all anonymous public chatters.
pub const ANON_PUBLIC_CHAT_ROOM: &str = "anon-chat-public";

/// Prefix shared by every anonymous room (chat and video).
pub const ANON_ROOM_PREFIX: &str = "anon-";

/// Prefix of anonymous chat rooms; members of these rooms chat under an alias.
pub const ANON_CHAT_ROOM_PREFIX: &str = "anon-chat";

/// Prefix of anonymous video pair rooms.
pub const ANON_VIDEO_ROOM_PREFIX: &str = "anon-video";

/// Prefix of direct-message chat rooms.
pub const DIRECT_MESSAGE_ROOM_PREFIX: &str = "dm:";

/// Opaque identifier of one live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyConnectionId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wrap an id produced by the factory, which is never blank.
    pub(crate) fn from_generated(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// First `len` characters of the id, used to tag pair room names.
    pub fn fragment(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Self-asserted, unauthenticated user name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a room. The category of a room is encoded in its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyRoomName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wrap a name produced by the factory, which is never blank.
    pub(crate) fn from_generated(value: String) -> Self {
        Self(value)
    }

    /// The anonymous public chat room.
    pub fn anonymous_public_chat() -> Self {
        Self(ANON_PUBLIC_CHAT_ROOM.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Anonymous chat or video room.
    pub fn is_anonymous(&self) -> bool {
        self.0.starts_with(ANON_ROOM_PREFIX)
    }

    /// Room whose members chat under an alias.
    pub fn is_anonymous_chat(&self) -> bool {
        self.0.starts_with(ANON_CHAT_ROOM_PREFIX)
    }

    pub fn is_anonymous_public_chat(&self) -> bool {
        self.0 == ANON_PUBLIC_CHAT_ROOM
    }

    pub fn is_direct_message(&self) -> bool {
        self.0.starts_with(DIRECT_MESSAGE_ROOM_PREFIX)
    }

    /// Whether the room appears in the public room list.
    pub fn is_listed(&self) -> bool {
        !self.is_anonymous() && !self.is_direct_message()
    }
}

impl TryFrom<String> for RoomName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text of a chat message, trimmed and never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatText(String);

impl ChatText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::BlankChatText);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ChatText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Pseudonym shown for a connection in anonymous chat rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonAlias(String);

impl AnonAlias {
    /// `Stranger-<number>`
    pub fn from_number(number: u16) -> Self {
        Self(format!("Stranger-{}", number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnonAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Call-negotiation payload (SDP offer / answer, ICE candidate).
///
/// Relayed verbatim; its structure is only meaningful to the two peers.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPayload(Value);

impl SignalPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}
