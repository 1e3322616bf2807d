//! Strongly typed inbound commands.
//!
//! Wire payloads are decoded and validated into this sum type at the
//! transport boundary; the relay never sees loosely typed data.

use super::{
    matchmaking::QueueKind,
    signaling::{InviteKind, SignalKind},
    value_object::{ChatText, ConnectionId, DisplayName, RoomName, SignalPayload},
};

#[derive(Debug, Clone, PartialEq)]
pub enum RelayCommand {
    RegisterIdentity {
        name: DisplayName,
    },
    ListUsers,
    JoinRoom {
        room: RoomName,
        name: Option<DisplayName>,
    },
    LeaveRoom {
        room: RoomName,
    },
    ListRooms,
    Signal {
        to: ConnectionId,
        kind: SignalKind,
        payload: SignalPayload,
    },
    JoinChat {
        room: RoomName,
    },
    SendChat {
        room: RoomName,
        text: ChatText,
    },
    FindAnonymous(QueueKind),
    LeaveAnonymous(QueueKind),
    Invite {
        kind: InviteKind,
        to: DisplayName,
        room: RoomName,
    },
    /// Client asked the server to close the connection.
    Disconnect,
}
