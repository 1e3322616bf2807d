//! Relay state: the single owner of every shared table.
//!
//! All mutation goes through `RelayState`, and every operation returns the
//! deliveries it produced instead of sending them. Callers hold the state
//! lock until those deliveries are handed to the transport.

use std::{collections::BTreeMap, sync::Arc};

use rendezvous_shared::time::{Clock, SystemClock};

use super::{
    event::{ChatMessage, Delivery, RelayEvent, UserDetail},
    factory::{AnonAliasFactory, RoomNameFactory},
    matchmaking::{EnqueueOutcome, MatchQueue, QueueKind},
    notifier::BroadcastNotifier,
    registry::ConnectionRegistry,
    room_table::RoomTable,
    signaling::{InviteKind, SignalKind},
    value_object::{
        AnonAlias, ChatText, ConnectionId, DisplayName, RoomName, SignalPayload, Timestamp,
    },
};

const FALLBACK_ANON_NAME: &str = "Stranger";
const FALLBACK_NAME: &str = "Anonymous";

/// Per-connection state that is not part of a shared table.
#[derive(Debug, Clone)]
struct Session {
    connected_at: Timestamp,
    alias: Option<AnonAlias>,
}

pub struct RelayState {
    sessions: BTreeMap<ConnectionId, Session>,
    registry: ConnectionRegistry,
    rooms: RoomTable,
    chat_queue: MatchQueue,
    video_queue: MatchQueue,
    clock: Arc<dyn Clock>,
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RelayState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: BTreeMap::new(),
            registry: ConnectionRegistry::new(),
            rooms: RoomTable::new(),
            chat_queue: MatchQueue::new(QueueKind::Chat),
            video_queue: MatchQueue::new(QueueKind::Video),
            clock,
        }
    }

    // ========================================
    // Connection lifecycle
    // ========================================

    /// Start tracking a new connection.
    pub fn connect(&mut self, connection_id: ConnectionId) -> Vec<Delivery> {
        let session = Session {
            connected_at: self.now(),
            alias: None,
        };
        self.sessions.insert(connection_id.clone(), session);
        let ready = RelayEvent::ConnectionReady {
            connection_id: connection_id.clone(),
        };
        vec![Delivery::to(connection_id, ready)]
    }

    /// Tear down every piece of state held for `connection_id`.
    ///
    /// Identity binding, alias, queue entries and room memberships go in
    /// one step; the remaining clients then get one snapshot of each table.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<Delivery> {
        if self.sessions.remove(connection_id).is_none() {
            return Vec::new();
        }

        let public_room = RoomName::anonymous_public_chat();
        let was_in_public_chat = self.rooms.is_member(connection_id, &public_room);
        let unbound = self.registry.unregister(connection_id);
        self.rooms.leave_all(connection_id);
        self.chat_queue.dequeue(connection_id);
        self.video_queue.dequeue(connection_id);

        let mut deliveries = Vec::new();
        if unbound.is_some() {
            deliveries.push(BroadcastNotifier::users(&self.registry, self.everyone()));
        }
        deliveries.push(BroadcastNotifier::rooms(&self.rooms, self.everyone()));
        if was_in_public_chat {
            deliveries.push(BroadcastNotifier::anon_chat_count(&self.rooms));
        }
        settle(deliveries)
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.sessions.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn connected_at(&self, connection_id: &ConnectionId) -> Option<Timestamp> {
        self.sessions
            .get(connection_id)
            .map(|session| session.connected_at)
    }

    // ========================================
    // Connection registry
    // ========================================

    /// Bind `name` to the connection and broadcast the user list.
    pub fn register_identity(
        &mut self,
        connection_id: ConnectionId,
        name: DisplayName,
    ) -> Vec<Delivery> {
        if !self.is_connected(&connection_id) {
            return Vec::new();
        }
        if let Some(evicted) = self.registry.register(connection_id.clone(), name.clone()) {
            tracing::debug!(
                "Name '{}' moved from connection '{}' to '{}'",
                name,
                evicted,
                connection_id
            );
        }
        vec![BroadcastNotifier::users(&self.registry, self.everyone())]
    }

    /// User list snapshot for the requester only.
    pub fn list_users(&self, connection_id: &ConnectionId) -> Vec<Delivery> {
        if !self.is_connected(connection_id) {
            return Vec::new();
        }
        vec![BroadcastNotifier::users(
            &self.registry,
            vec![connection_id.clone()],
        )]
    }

    pub fn lookup_connection(&self, name: &DisplayName) -> Option<&ConnectionId> {
        self.registry.lookup_connection(name)
    }

    pub fn lookup_name(&self, connection_id: &ConnectionId) -> Option<&DisplayName> {
        self.registry.lookup_name(connection_id)
    }

    pub fn list_active_names(&self) -> Vec<DisplayName> {
        self.registry.list_active_names()
    }

    pub fn user_details(&self) -> Vec<UserDetail> {
        self.registry
            .active_bindings()
            .into_iter()
            .map(|(name, connection_id)| UserDetail {
                name,
                connection_id,
            })
            .collect()
    }

    // ========================================
    // Room membership
    // ========================================

    /// Join a call room, optionally binding a display name first.
    ///
    /// Members already in the room are told who joined; the joiner gets an
    /// acknowledgement.
    pub fn join_room(
        &mut self,
        connection_id: ConnectionId,
        room: RoomName,
        name: Option<DisplayName>,
    ) -> Vec<Delivery> {
        if !self.is_connected(&connection_id) {
            return Vec::new();
        }

        let mut deliveries = Vec::new();
        if let Some(name) = name {
            deliveries.extend(self.register_identity(connection_id.clone(), name));
        }

        let joined_name = self.registry.lookup_name(&connection_id).cloned();
        let existing_members: Vec<ConnectionId> = self
            .rooms
            .members(&room)
            .into_iter()
            .filter(|member| member != &connection_id)
            .collect();
        self.rooms.join(connection_id.clone(), room.clone());

        let user_joined = RelayEvent::UserJoined {
            room: room.clone(),
            name: joined_name.clone(),
            connection_id: connection_id.clone(),
        };
        deliveries.push(Delivery::to_many(existing_members, user_joined));
        let room_joined = RelayEvent::RoomJoined {
            room: room.clone(),
            name: joined_name,
        };
        deliveries.push(Delivery::to(connection_id, room_joined));
        if room.is_listed() {
            deliveries.push(BroadcastNotifier::rooms(&self.rooms, self.everyone()));
        }
        if room.is_anonymous_public_chat() {
            deliveries.push(BroadcastNotifier::anon_chat_count(&self.rooms));
        }
        settle(deliveries)
    }

    pub fn leave_room(&mut self, connection_id: &ConnectionId, room: &RoomName) -> Vec<Delivery> {
        if !self.rooms.leave(connection_id, room) {
            return Vec::new();
        }

        let mut deliveries = Vec::new();
        if room.is_listed() {
            deliveries.push(BroadcastNotifier::rooms(&self.rooms, self.everyone()));
        }
        if room.is_anonymous_public_chat() {
            deliveries.push(BroadcastNotifier::anon_chat_count(&self.rooms));
        }
        settle(deliveries)
    }

    /// Room list snapshot for the requester only.
    pub fn list_rooms(&self, connection_id: &ConnectionId) -> Vec<Delivery> {
        if !self.is_connected(connection_id) {
            return Vec::new();
        }
        vec![BroadcastNotifier::rooms(
            &self.rooms,
            vec![connection_id.clone()],
        )]
    }

    pub fn member_count(&self, room: &RoomName) -> usize {
        self.rooms.member_count(room)
    }

    pub fn room_members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.rooms.members(room)
    }

    pub fn list_room_names(&self) -> Vec<RoomName> {
        self.rooms.list_room_names()
    }

    /// `(room, member count)` for every non-empty room, anonymous ones included.
    pub fn room_summaries(&self) -> Vec<(RoomName, usize)> {
        self.rooms.summaries()
    }

    // ========================================
    // Chat
    // ========================================

    /// Join a chat room. Anonymous chat rooms hand out an alias on first use.
    pub fn join_chat(&mut self, connection_id: ConnectionId, room: RoomName) -> Vec<Delivery> {
        if !self.is_connected(&connection_id) {
            return Vec::new();
        }
        if room.is_anonymous_chat() {
            self.ensure_alias(&connection_id);
        }
        self.rooms.join(connection_id.clone(), room.clone());

        let joined = RelayEvent::ChatJoined { room: room.clone() };
        let mut deliveries = vec![Delivery::to(connection_id, joined)];
        if room.is_anonymous_public_chat() {
            deliveries.push(BroadcastNotifier::anon_chat_count(&self.rooms));
        }
        deliveries
    }

    /// Broadcast a chat message to the current members of `room`.
    pub fn send_chat(
        &self,
        connection_id: &ConnectionId,
        room: RoomName,
        text: ChatText,
    ) -> Vec<Delivery> {
        if !self.is_connected(connection_id) {
            return Vec::new();
        }
        let members = self.rooms.members(&room);
        if members.is_empty() {
            return Vec::new();
        }

        let from = if room.is_anonymous_chat() {
            self.alias_of(connection_id)
                .map_or_else(|| FALLBACK_ANON_NAME.to_string(), |a| a.as_str().to_string())
        } else {
            self.registry
                .lookup_name(connection_id)
                .map_or_else(|| FALLBACK_NAME.to_string(), |n| n.as_str().to_string())
        };
        let message = ChatMessage {
            room,
            from,
            from_id: connection_id.clone(),
            text,
            at: self.now(),
        };
        vec![Delivery::to_many(members, RelayEvent::ChatMessage(message))]
    }

    pub fn alias_of(&self, connection_id: &ConnectionId) -> Option<&AnonAlias> {
        self.sessions
            .get(connection_id)
            .and_then(|session| session.alias.as_ref())
    }

    // ========================================
    // Matchmaking
    // ========================================

    /// Queue the connection for an anonymous match of the given kind.
    pub fn find_anonymous(
        &mut self,
        connection_id: ConnectionId,
        kind: QueueKind,
    ) -> Vec<Delivery> {
        if !self.is_connected(&connection_id) {
            return Vec::new();
        }
        // A connection waits in one queue at a time.
        self.queue_mut(kind.other()).dequeue(&connection_id);

        match self.queue_mut(kind).enqueue(connection_id.clone()) {
            EnqueueOutcome::AlreadyQueued => Vec::new(),
            EnqueueOutcome::Waiting => {
                vec![Delivery::to(connection_id, RelayEvent::Searching { kind })]
            }
            EnqueueOutcome::PairReady => self.form_match(kind, &connection_id),
        }
    }

    /// Withdraw from anonymous chat or video.
    ///
    /// Leaving chat also drops the alias and every anonymous chat room.
    pub fn leave_anonymous(
        &mut self,
        connection_id: &ConnectionId,
        kind: QueueKind,
    ) -> Vec<Delivery> {
        if !self.is_connected(connection_id) {
            return Vec::new();
        }
        self.queue_mut(kind).dequeue(connection_id);

        let ack = RelayEvent::AnonymousLeft { kind };
        let mut deliveries = vec![Delivery::to(connection_id.clone(), ack)];
        if kind == QueueKind::Chat {
            if let Some(session) = self.sessions.get_mut(connection_id) {
                session.alias = None;
            }
            let left = self
                .rooms
                .leave_matching(connection_id, RoomName::is_anonymous_chat);
            if left.iter().any(RoomName::is_anonymous_public_chat) {
                deliveries.push(BroadcastNotifier::anon_chat_count(&self.rooms));
            }
        }
        settle(deliveries)
    }

    pub fn queue(&self, kind: QueueKind) -> &MatchQueue {
        match kind {
            QueueKind::Chat => &self.chat_queue,
            QueueKind::Video => &self.video_queue,
        }
    }

    fn queue_mut(&mut self, kind: QueueKind) -> &mut MatchQueue {
        match kind {
            QueueKind::Chat => &mut self.chat_queue,
            QueueKind::Video => &mut self.video_queue,
        }
    }

    /// Pair the two oldest waiting connections into a fresh room.
    ///
    /// If one of them is no longer connected, the other goes back to the
    /// head of the queue and no match is made.
    fn form_match(&mut self, kind: QueueKind, newcomer: &ConnectionId) -> Vec<Delivery> {
        let Some((older, newer)) = self.queue_mut(kind).take_pair() else {
            return Vec::new();
        };

        let older_alive = self.is_connected(&older);
        let newer_alive = self.is_connected(&newer);
        if !(older_alive && newer_alive) {
            tracing::warn!(
                "Stale entry in {:?} queue while pairing '{}' and '{}'",
                kind,
                older,
                newer
            );
            if newer_alive {
                self.queue_mut(kind).requeue_front(newer);
            }
            if older_alive {
                self.queue_mut(kind).requeue_front(older);
            }
            if self.queue(kind).contains(newcomer) {
                let searching = RelayEvent::Searching { kind };
                return vec![Delivery::to(newcomer.clone(), searching)];
            }
            return Vec::new();
        }

        let room = RoomNameFactory::anonymous_pair(kind, self.now(), &older, &newer);
        if kind == QueueKind::Chat {
            self.ensure_alias(&older);
            self.ensure_alias(&newer);
        }
        self.rooms.join(older.clone(), room.clone());
        self.rooms.join(newer.clone(), room.clone());
        tracing::info!(
            "Matched '{}' with '{}' in {:?} room '{}'",
            older,
            newer,
            kind,
            room
        );

        let matched = RelayEvent::Matched { kind, room };
        vec![
            Delivery::to(older, matched.clone()),
            Delivery::to(newer, matched),
        ]
    }

    // ========================================
    // Signaling
    // ========================================

    /// Forward a call-setup payload to `to`, tagged with the sender.
    ///
    /// Dropped silently when either side is not connected.
    pub fn relay_signal(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        kind: SignalKind,
        payload: SignalPayload,
    ) -> Vec<Delivery> {
        if !self.is_connected(from) || !self.is_connected(to) {
            tracing::debug!("Dropping {:?} from '{}' to unknown '{}'", kind, from, to);
            return Vec::new();
        }
        let event = RelayEvent::Signal {
            kind,
            from: from.clone(),
            payload,
        };
        vec![Delivery::to(to.clone(), event)]
    }

    /// Deliver an invite to whoever currently holds `to`.
    pub fn invite(
        &self,
        from: &ConnectionId,
        kind: InviteKind,
        to: &DisplayName,
        room: RoomName,
    ) -> Vec<Delivery> {
        if !self.is_connected(from) {
            return Vec::new();
        }
        let Some(target) = self.registry.lookup_connection(to) else {
            tracing::debug!("Dropping {:?} invite to unregistered '{}'", kind, to);
            return Vec::new();
        };
        let from_name = self
            .registry
            .lookup_name(from)
            .map_or_else(|| FALLBACK_NAME.to_string(), |n| n.as_str().to_string());
        let event = RelayEvent::Invite {
            kind,
            from: from_name,
            room,
        };
        vec![Delivery::to(target.clone(), event)]
    }

    // ========================================
    // Helpers
    // ========================================

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    fn everyone(&self) -> Vec<ConnectionId> {
        self.sessions.keys().cloned().collect()
    }

    fn ensure_alias(&mut self, connection_id: &ConnectionId) {
        if let Some(session) = self.sessions.get_mut(connection_id)
            && session.alias.is_none()
        {
            session.alias = Some(AnonAliasFactory::generate());
        }
    }
}

/// Drop deliveries nobody would receive.
fn settle(mut deliveries: Vec<Delivery>) -> Vec<Delivery> {
    deliveries.retain(|delivery| !delivery.targets.is_empty());
    deliveries
}
