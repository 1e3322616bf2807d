//! Domain layer: relay state, value objects and the outbound port.

pub mod command;
pub mod error;
pub mod event;
pub mod factory;
pub mod matchmaking;
pub mod message_pusher;
pub mod notifier;
pub mod registry;
pub mod relay;
pub mod room_table;
pub mod signaling;
pub mod value_object;

pub use command::RelayCommand;
pub use error::{MessagePushError, ValueObjectError};
pub use event::{ChatMessage, Delivery, RelayEvent, UserDetail};
pub use factory::{AnonAliasFactory, ConnectionIdFactory, RoomNameFactory};
pub use matchmaking::{EnqueueOutcome, MatchQueue, QueueKind};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notifier::BroadcastNotifier;
pub use registry::ConnectionRegistry;
pub use relay::RelayState;
pub use room_table::RoomTable;
pub use signaling::{InviteKind, SignalKind};
pub use value_object::{
    AnonAlias, ChatText, ConnectionId, DisplayName, RoomName, SignalPayload, Timestamp,
};
