//! UseCase layer.
//!
//! Each use case locks the shared relay state, applies one domain
//! operation and pushes the resulting deliveries before releasing the lock.

mod chat;
mod connect_session;
mod delivery;
mod disconnect_session;
mod error;
mod matchmaking;
mod presence;
mod room;
mod signaling;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat::ChatUseCase;
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{ConnectError, GetRoomDetailError};
pub use matchmaking::MatchmakingUseCase;
pub use presence::PresenceUseCase;
pub use room::{RoomSnapshot, RoomUseCase};
pub use signaling::SignalingUseCase;
