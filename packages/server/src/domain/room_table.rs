//! Room membership table.

use std::collections::{BTreeMap, BTreeSet};

use super::value_object::{ConnectionId, RoomName};

/// Which connections belong to which named rooms.
///
/// Empty rooms never stay in the table. A connection may be a member of
/// any number of rooms at once.
#[derive(Debug, Default, Clone)]
pub struct RoomTable {
    rooms: BTreeMap<RoomName, BTreeSet<ConnectionId>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `connection_id` to `room`, creating the room when absent.
    ///
    /// Returns `false` when the connection was already a member.
    pub fn join(&mut self, connection_id: ConnectionId, room: RoomName) -> bool {
        self.rooms.entry(room).or_default().insert(connection_id)
    }

    /// Remove `connection_id` from `room`; the room is dropped once empty.
    ///
    /// Returns `false` when the connection was not a member.
    pub fn leave(&mut self, connection_id: &ConnectionId, room: &RoomName) -> bool {
        let Some(members) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(connection_id);
        if members.is_empty() {
            self.rooms.remove(room);
        }
        removed
    }

    /// Remove `connection_id` from every room it belongs to.
    ///
    /// Returns the rooms the connection left.
    pub fn leave_all(&mut self, connection_id: &ConnectionId) -> Vec<RoomName> {
        self.leave_matching(connection_id, |_| true)
    }

    /// Remove `connection_id` from every room whose name satisfies `predicate`.
    pub fn leave_matching(
        &mut self,
        connection_id: &ConnectionId,
        predicate: impl Fn(&RoomName) -> bool,
    ) -> Vec<RoomName> {
        let mut left = Vec::new();
        self.rooms.retain(|room, members| {
            if predicate(room) && members.remove(connection_id) {
                left.push(room.clone());
            }
            !members.is_empty()
        });
        left
    }

    pub fn member_count(&self, room: &RoomName) -> usize {
        self.rooms.get(room).map_or(0, BTreeSet::len)
    }

    pub fn is_member(&self, connection_id: &ConnectionId, room: &RoomName) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(connection_id))
    }

    /// Members of `room` in a stable order.
    pub fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Names of every non-empty room, sorted.
    pub fn list_room_names(&self) -> Vec<RoomName> {
        self.rooms.keys().cloned().collect()
    }

    /// Names of the non-empty rooms shown in the public room list, sorted.
    pub fn list_listed_room_names(&self) -> Vec<RoomName> {
        self.rooms
            .keys()
            .filter(|room| room.is_listed())
            .cloned()
            .collect()
    }

    /// `(room, member count)` for every non-empty room.
    pub fn summaries(&self) -> Vec<(RoomName, usize)> {
        self.rooms
            .iter()
            .map(|(room, members)| (room.clone(), members.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn room(value: &str) -> RoomName {
        RoomName::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_join_creates_room_and_counts_members() {
        // テスト項目: 参加するとルームが作成され、人数が数えられる
        // given (前提条件):
        let mut table = RoomTable::new();

        // when (操作):
        table.join(id("c1"), room("lobby"));
        table.join(id("c2"), room("lobby"));

        // then (期待する結果):
        assert_eq!(table.member_count(&room("lobby")), 2);
        assert_eq!(table.members(&room("lobby")), vec![id("c1"), id("c2")]);
    }

    #[test]
    fn test_join_twice_does_not_double_count() {
        // テスト項目: 同じ接続が二度参加しても人数は増えない
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(id("c1"), room("lobby"));

        // when (操作):
        let inserted = table.join(id("c1"), room("lobby"));

        // then (期待する結果):
        assert!(!inserted);
        assert_eq!(table.member_count(&room("lobby")), 1);
    }

    #[test]
    fn test_leave_prunes_empty_room() {
        // テスト項目: 最後のメンバーが退出するとルームが削除される
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(id("c1"), room("lobby"));

        // when (操作):
        let removed = table.leave(&id("c1"), &room("lobby"));

        // then (期待する結果):
        assert!(removed);
        assert_eq!(table.member_count(&room("lobby")), 0);
        assert!(table.list_room_names().is_empty());
    }

    #[test]
    fn test_leave_unknown_room_is_noop() {
        // テスト項目: 存在しないルームからの退出は何もしない
        // given (前提条件):
        let mut table = RoomTable::new();

        // when (操作):
        let removed = table.leave(&id("c1"), &room("nowhere"));

        // then (期待する結果):
        assert!(!removed);
        assert!(table.is_empty());
    }

    #[test]
    fn test_leave_all_removes_connection_everywhere() {
        // テスト項目: 切断時に全ルームから削除され、空になったルームは消える
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(id("c1"), room("a"));
        table.join(id("c1"), room("b"));
        table.join(id("c2"), room("b"));
        table.join(id("c2"), room("c"));

        // when (操作):
        let left = table.leave_all(&id("c1"));

        // then (期待する結果):
        assert_eq!(left, vec![room("a"), room("b")]);
        assert_eq!(table.list_room_names(), vec![room("b"), room("c")]);
        assert_eq!(table.member_count(&room("b")), 1);
    }

    #[test]
    fn test_leave_matching_only_touches_matching_rooms() {
        // テスト項目: 条件に一致するルームからのみ退出する
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(id("c1"), RoomName::anonymous_public_chat());
        table.join(id("c1"), room("anon-chat-1-aaaaa-bbbbb"));
        table.join(id("c1"), room("lobby"));

        // when (操作):
        let left = table.leave_matching(&id("c1"), RoomName::is_anonymous_chat);

        // then (期待する結果):
        assert_eq!(left.len(), 2);
        assert_eq!(table.list_room_names(), vec![room("lobby")]);
    }

    #[test]
    fn test_listed_room_names_hide_anonymous_and_direct_rooms() {
        // テスト項目: 公開ルーム一覧には匿名ルームと DM ルームが含まれない
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(id("c1"), room("zeta"));
        table.join(id("c1"), room("alpha"));
        table.join(id("c2"), room("dm:alice|bob"));
        table.join(id("c3"), room("anon-video-1-aaaaa-bbbbb"));

        // when (操作):
        let listed = table.list_listed_room_names();

        // then (期待する結果):
        assert_eq!(listed, vec![room("alpha"), room("zeta")]);
        assert_eq!(table.len(), 4);
    }
}
