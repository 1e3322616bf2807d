//! Outbound events produced by relay operations.

use super::{
    matchmaking::QueueKind,
    signaling::{InviteKind, SignalKind},
    value_object::{ChatText, ConnectionId, DisplayName, RoomName, SignalPayload, Timestamp},
};

/// A registered user as shown in user-list snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    pub name: DisplayName,
    pub connection_id: ConnectionId,
}

/// Transient chat message; broadcast once and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room: RoomName,
    /// Registered name or anonymous alias of the sender.
    pub from: String,
    pub from_id: ConnectionId,
    pub text: ChatText,
    pub at: Timestamp,
}

/// Event pushed from the relay to one or more connections.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Greets a new connection with its assigned id.
    ConnectionReady { connection_id: ConnectionId },
    /// Full snapshot of registered users.
    UsersUpdated { users: Vec<UserDetail> },
    /// Full snapshot of listed rooms.
    RoomsUpdated { rooms: Vec<RoomName> },
    /// Someone joined a room the receiver is in.
    UserJoined {
        room: RoomName,
        name: Option<DisplayName>,
        connection_id: ConnectionId,
    },
    /// Acknowledges a room join to the joiner.
    RoomJoined {
        room: RoomName,
        name: Option<DisplayName>,
    },
    ChatJoined { room: RoomName },
    ChatMessage(ChatMessage),
    AnonChatCount { room: RoomName, count: usize },
    Matched { kind: QueueKind, room: RoomName },
    Searching { kind: QueueKind },
    AnonymousLeft { kind: QueueKind },
    Signal {
        kind: SignalKind,
        from: ConnectionId,
        payload: SignalPayload,
    },
    Invite {
        kind: InviteKind,
        from: String,
        room: RoomName,
    },
}

/// An event together with the connections it must reach.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub targets: Vec<ConnectionId>,
    pub event: RelayEvent,
}

impl Delivery {
    pub fn to(target: ConnectionId, event: RelayEvent) -> Self {
        Self {
            targets: vec![target],
            event,
        }
    }

    pub fn to_many(targets: Vec<ConnectionId>, event: RelayEvent) -> Self {
        Self { targets, event }
    }

    pub fn reaches(&self, connection_id: &ConnectionId) -> bool {
        self.targets.contains(connection_id)
    }
}
