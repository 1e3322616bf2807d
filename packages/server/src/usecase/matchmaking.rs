//! UseCase: 匿名マッチング（チャット・ビデオ）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 待機列への追加と `searching` 通知
//! - 2人揃った時点での即時マッチと `matched` 通知
//! - 待機からの離脱
//!
//! ### どのような状況を想定しているか
//! - 正常系：A, B, C, D の順に到着し (A,B), (C,D) がマッチする
//! - エッジケース：待機中の相手が先に切断する

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, QueueKind, RelayState};

use super::delivery::deliver;

/// 匿名マッチングのユースケース
pub struct MatchmakingUseCase {
    state: Arc<Mutex<RelayState>>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl MatchmakingUseCase {
    pub fn new(state: Arc<Mutex<RelayState>>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state,
            message_pusher,
        }
    }

    pub async fn find(&self, connection_id: ConnectionId, kind: QueueKind) {
        let mut state = self.state.lock().await;
        tracing::debug!(
            "Connection '{}' looking for a {:?} match",
            connection_id,
            kind
        );
        let deliveries = state.find_anonymous(connection_id, kind);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    pub async fn leave(&self, connection_id: &ConnectionId, kind: QueueKind) {
        let mut state = self.state.lock().await;
        let deliveries = state.leave_anonymous(connection_id, kind);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    /// 待機中の接続数
    pub async fn waiting_count(&self, kind: QueueKind) -> usize {
        self.state.lock().await.queue(kind).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::{
        DisconnectSessionUseCase,
        test_support::{connect, create_test_message_pusher, create_test_state, drain_events},
    };

    fn matched_room(events: &[serde_json::Value], event_name: &str) -> Option<String> {
        events
            .iter()
            .find(|event| event["event"] == event_name)
            .and_then(|event| event["data"]["room"].as_str())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn test_video_pairs_in_arrival_order() {
        // テスト項目: A, B, C, D の順に到着すると (A,B), (C,D) がマッチする
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let mut peers = Vec::new();
        for id in ["conn-a", "conn-b", "conn-c", "conn-d"] {
            peers.push(connect(&state, &pusher, id).await);
        }
        let usecase = MatchmakingUseCase::new(state.clone(), pusher);

        // when (操作):
        for (connection_id, _) in &peers {
            usecase.find(connection_id.clone(), QueueKind::Video).await;
        }

        // then (期待する結果):
        let events: Vec<Vec<serde_json::Value>> = peers
            .iter_mut()
            .map(|(_, rx)| drain_events(rx))
            .collect();
        assert_eq!(events[0][0]["event"], "anon:video:searching");
        assert_eq!(events[2][0]["event"], "anon:video:searching");

        let room_ab = matched_room(&events[0], "anon:video:matched").unwrap();
        let partner_room = matched_room(&events[1], "anon:video:matched");
        assert_eq!(partner_room, Some(room_ab.clone()));
        let room_cd = matched_room(&events[2], "anon:video:matched").unwrap();
        let partner_room = matched_room(&events[3], "anon:video:matched");
        assert_eq!(partner_room, Some(room_cd.clone()));
        assert_ne!(room_ab, room_cd);
        assert!(room_ab.starts_with("anon-video-"));
        assert_eq!(usecase.waiting_count(QueueKind::Video).await, 0);
    }

    #[tokio::test]
    async fn test_waiter_survives_partner_disconnect() {
        // テスト項目: 待機中の相手が切断しても、次の到着者とマッチする
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let (a, mut a_rx) = connect(&state, &pusher, "conn-a").await;
        let (b, _b_rx) = connect(&state, &pusher, "conn-b").await;
        let (c, mut c_rx) = connect(&state, &pusher, "conn-c").await;
        let usecase = MatchmakingUseCase::new(state.clone(), pusher.clone());
        usecase.find(b.clone(), QueueKind::Chat).await;
        DisconnectSessionUseCase::new(state.clone(), pusher)
            .execute(&b)
            .await;
        usecase.find(a, QueueKind::Chat).await;
        drain_events(&mut a_rx);

        // when (操作):
        usecase.find(c, QueueKind::Chat).await;

        // then (期待する結果):
        let room_a = matched_room(&drain_events(&mut a_rx), "anon:chat:matched").unwrap();
        let room_c = matched_room(&drain_events(&mut c_rx), "anon:chat:matched").unwrap();
        assert_eq!(room_a, room_c);
        assert!(room_a.starts_with("anon-chat-"));
    }

    #[tokio::test]
    async fn test_leave_video_queue() {
        // テスト項目: 待機から離脱すると left が届き、待機列から消える
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let (a, mut a_rx) = connect(&state, &pusher, "conn-a").await;
        let usecase = MatchmakingUseCase::new(state.clone(), pusher);
        usecase.find(a.clone(), QueueKind::Video).await;
        drain_events(&mut a_rx);

        // when (操作):
        usecase.leave(&a, QueueKind::Video).await;

        // then (期待する結果):
        let events = drain_events(&mut a_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "anon:video:left");
        assert_eq!(usecase.waiting_count(QueueKind::Video).await, 0);
    }
}
