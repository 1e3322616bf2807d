//! FIFO matchmaking queues for anonymous chat and video.

use std::collections::VecDeque;

use super::value_object::{ANON_CHAT_ROOM_PREFIX, ANON_VIDEO_ROOM_PREFIX, ConnectionId};

/// Which anonymous matchmaking queue an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Chat,
    Video,
}

impl QueueKind {
    /// Prefix of the pair rooms created by this queue.
    pub fn room_prefix(self) -> &'static str {
        match self {
            QueueKind::Chat => ANON_CHAT_ROOM_PREFIX,
            QueueKind::Video => ANON_VIDEO_ROOM_PREFIX,
        }
    }

    /// The queue a connection is withdrawn from when it joins this one.
    pub fn other(self) -> Self {
        match self {
            QueueKind::Chat => QueueKind::Video,
            QueueKind::Video => QueueKind::Chat,
        }
    }
}

/// Result of appending a connection to a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The connection was already waiting; nothing changed.
    AlreadyQueued,
    /// The connection is the only one waiting.
    Waiting,
    /// At least two connections are waiting and a pair can be taken.
    PairReady,
}

/// Strict first-in, first-matched waiting list.
#[derive(Debug, Clone)]
pub struct MatchQueue {
    kind: QueueKind,
    waiting: VecDeque<ConnectionId>,
}

impl MatchQueue {
    pub fn new(kind: QueueKind) -> Self {
        Self {
            kind,
            waiting: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    pub fn enqueue(&mut self, connection_id: ConnectionId) -> EnqueueOutcome {
        if self.contains(&connection_id) {
            return EnqueueOutcome::AlreadyQueued;
        }
        self.waiting.push_back(connection_id);
        if self.waiting.len() >= 2 {
            EnqueueOutcome::PairReady
        } else {
            EnqueueOutcome::Waiting
        }
    }

    /// Remove `connection_id` wherever it is. Idempotent.
    pub fn dequeue(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|queued| queued != connection_id);
        self.waiting.len() != before
    }

    /// Take the two oldest entries, oldest first.
    ///
    /// Leaves the queue untouched when fewer than two are waiting.
    pub fn take_pair(&mut self) -> Option<(ConnectionId, ConnectionId)> {
        if self.waiting.len() < 2 {
            return None;
        }
        let first = self.waiting.pop_front()?;
        let second = self.waiting.pop_front()?;
        Some((first, second))
    }

    /// Put a survivor of a failed pairing back at the head of the line.
    pub fn requeue_front(&mut self, connection_id: ConnectionId) {
        if !self.contains(&connection_id) {
            self.waiting.push_front(connection_id);
        }
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.waiting.contains(connection_id)
    }

    /// Waiting connections, oldest first.
    pub fn waiting(&self) -> Vec<ConnectionId> {
        self.waiting.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
