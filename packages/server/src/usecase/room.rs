//! UseCase: 通話ルームへの参加・退出・一覧
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ルーム参加時の `user:joined`（既存メンバー宛て）と `room:join`（本人宛て）
//! - ルーム一覧のブロードキャスト
//! - HTTP API 用のスナップショット
//!
//! ### どのような状況を想定しているか
//! - 正常系：2人目の参加、退出によるルーム消滅
//! - エッジケース：存在しないルームの詳細取得

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, DisplayName, MessagePusher, RelayState, RoomName};

use super::{delivery::deliver, error::GetRoomDetailError};

/// ルームの中身のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room: RoomName,
    pub member_ids: Vec<ConnectionId>,
}

/// 通話ルームのユースケース
pub struct RoomUseCase {
    state: Arc<Mutex<RelayState>>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RoomUseCase {
    pub fn new(state: Arc<Mutex<RelayState>>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state,
            message_pusher,
        }
    }

    /// ルームに参加する（名前があれば先に登録する）
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room: RoomName,
        name: Option<DisplayName>,
    ) {
        let mut state = self.state.lock().await;
        tracing::debug!("Connection '{}' joining room '{}'", connection_id, room);
        let deliveries = state.join_room(connection_id, room, name);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    pub async fn leave(&self, connection_id: &ConnectionId, room: &RoomName) {
        let mut state = self.state.lock().await;
        let deliveries = state.leave_room(connection_id, room);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    /// 要求元にだけルーム一覧を送る
    pub async fn list(&self, connection_id: &ConnectionId) {
        let state = self.state.lock().await;
        let deliveries = state.list_rooms(connection_id);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    /// 空でない全ルームと人数（匿名ルームを含む）
    pub async fn summaries(&self) -> Vec<(RoomName, usize)> {
        self.state.lock().await.room_summaries()
    }

    pub async fn detail(&self, room: &str) -> Result<RoomSnapshot, GetRoomDetailError> {
        let room = RoomName::new(room.to_string()).map_err(|_| GetRoomDetailError::RoomNotFound)?;
        let member_ids = self.state.lock().await.room_members(&room);
        if member_ids.is_empty() {
            return Err(GetRoomDetailError::RoomNotFound);
        }
        Ok(RoomSnapshot { room, member_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{
        connect, create_test_message_pusher, create_test_state, drain_events,
    };

    fn room(value: &str) -> RoomName {
        RoomName::new(value.to_string()).unwrap()
    }

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_second_joiner_is_announced_to_first() {
        // テスト項目: 2人目の参加が1人目に user:joined として通知される
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let (alice, mut alice_rx) = connect(&state, &pusher, "conn-a").await;
        let (bob, mut bob_rx) = connect(&state, &pusher, "conn-b").await;
        let usecase = RoomUseCase::new(state.clone(), pusher);
        usecase
            .join(alice, room("call-1"), Some(name("alice")))
            .await;
        drain_events(&mut alice_rx);
        drain_events(&mut bob_rx);

        // when (操作):
        usecase.join(bob, room("call-1"), Some(name("bob"))).await;

        // then (期待する結果):
        let to_alice = drain_events(&mut alice_rx);
        assert!(to_alice.iter().any(|event| event["event"] == "user:joined"
            && event["data"]["username"] == "bob"
            && event["data"]["id"] == "conn-b"));

        let to_bob = drain_events(&mut bob_rx);
        assert!(to_bob.iter().any(|event| event["event"] == "room:join"
            && event["data"]["room"] == "call-1"
            && event["data"]["username"] == "bob"));
        assert!(!to_bob.iter().any(|event| event["event"] == "user:joined"));
    }

    #[tokio::test]
    async fn test_leave_last_member_removes_room() {
        // テスト項目: 最後のメンバーが退出するとルームが消え、一覧が再送される
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let (alice, mut alice_rx) = connect(&state, &pusher, "conn-a").await;
        let usecase = RoomUseCase::new(state.clone(), pusher);
        usecase.join(alice.clone(), room("call-1"), None).await;
        drain_events(&mut alice_rx);

        // when (操作):
        usecase.leave(&alice, &room("call-1")).await;

        // then (期待する結果):
        let events = drain_events(&mut alice_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "rooms:update");
        assert_eq!(events[0]["data"]["rooms"], serde_json::json!([]));
        assert!(usecase.summaries().await.is_empty());
    }

    #[tokio::test]
    async fn test_room_detail() {
        // テスト項目: ルーム詳細はメンバー ID を返し、存在しないルームはエラーになる
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let (alice, _alice_rx) = connect(&state, &pusher, "conn-a").await;
        let (bob, _bob_rx) = connect(&state, &pusher, "conn-b").await;
        let usecase = RoomUseCase::new(state.clone(), pusher);
        usecase.join(bob.clone(), room("call-1"), None).await;
        usecase.join(alice.clone(), room("call-1"), None).await;

        // when (操作):
        let detail = usecase.detail("call-1").await;
        let missing = usecase.detail("call-2").await;

        // then (期待する結果):
        assert_eq!(
            detail,
            Ok(RoomSnapshot {
                room: room("call-1"),
                member_ids: vec![alice, bob],
            })
        );
        assert_eq!(missing, Err(GetRoomDetailError::RoomNotFound));
        assert_eq!(usecase.summaries().await, vec![(room("call-1"), 2)]);
    }
}
