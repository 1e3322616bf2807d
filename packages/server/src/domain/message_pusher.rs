//! Port through which the relay reaches connected clients.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, event::RelayEvent, value_object::ConnectionId};

/// Channel feeding one connection's outbound write task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Pushes relay events to connections.
///
/// Implementations own encoding; the domain only hands over events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Push to a single connection; fails when it is unknown.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RelayEvent,
    ) -> Result<(), MessagePushError>;

    /// Push to many connections, skipping the ones that are gone.
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &RelayEvent,
    ) -> Result<(), MessagePushError>;
}
