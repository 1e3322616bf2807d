//! Domain error types.

use thiserror::Error;

/// Value object construction failures.
///
/// These never reach a client: the boundary drops the offending event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("chat message must not be blank")]
    BlankChatText,
}

/// Failures of the outbound transport port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client '{0}' is not connected")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to encode outbound event: {0}")]
    Encode(String),
}
