//! Hands the deliveries produced by a relay operation to the transport.

use crate::domain::{Delivery, MessagePusher};

/// Push every delivery in order.
///
/// Callers must still hold the relay state lock so that deliveries from
/// one operation are never interleaved with those of another.
pub(crate) async fn deliver(message_pusher: &dyn MessagePusher, deliveries: Vec<Delivery>) {
    for Delivery { targets, event } in deliveries {
        let result = match targets.as_slice() {
            [target] => message_pusher.push_to(target, &event).await,
            _ => message_pusher.broadcast(&targets, &event).await,
        };
        // a peer that went away mid-operation is not an error for the caller
        if let Err(e) = result {
            tracing::warn!("Failed to deliver event: {}", e);
        }
    }
}
