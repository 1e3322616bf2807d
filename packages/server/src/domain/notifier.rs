//! Broadcast notifier: full snapshots of registry and room state.
//!
//! Snapshots are taken while the caller holds the relay state, so every
//! broadcast observes a consistent view.

use super::{
    event::{Delivery, RelayEvent, UserDetail},
    registry::ConnectionRegistry,
    room_table::RoomTable,
    value_object::{ConnectionId, RoomName},
};

pub struct BroadcastNotifier;

impl BroadcastNotifier {
    /// User list snapshot.
    pub fn users(registry: &ConnectionRegistry, targets: Vec<ConnectionId>) -> Delivery {
        let users = registry
            .active_bindings()
            .into_iter()
            .map(|(name, connection_id)| UserDetail {
                name,
                connection_id,
            })
            .collect();
        Delivery::to_many(targets, RelayEvent::UsersUpdated { users })
    }

    /// Listed room snapshot.
    pub fn rooms(rooms: &RoomTable, targets: Vec<ConnectionId>) -> Delivery {
        let event = RelayEvent::RoomsUpdated {
            rooms: rooms.list_listed_room_names(),
        };
        Delivery::to_many(targets, event)
    }

    /// Member count of the anonymous public chat room, sent to its members only.
    pub fn anon_chat_count(rooms: &RoomTable) -> Delivery {
        let room = RoomName::anonymous_public_chat();
        let count = rooms.member_count(&room);
        let members = rooms.members(&room);
        Delivery::to_many(members, RelayEvent::AnonChatCount { room, count })
    }
}
