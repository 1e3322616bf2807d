//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - 名前・ルーム・待機列からの一括削除と、残りの接続への通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：名前登録・ルーム参加済みの接続が切断される
//! - エッジケース：既に切断済みの接続を再度切断する

use std::sync::Arc;

use rendezvous_shared::time::timestamp_to_rfc3339;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, RelayState};

use super::delivery::deliver;

/// 切断処理のユースケース
pub struct DisconnectSessionUseCase {
    /// 共有リレー状態
    state: Arc<Mutex<RelayState>>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
    pub fn new(state: Arc<Mutex<RelayState>>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state,
            message_pusher,
        }
    }

    /// 接続に紐づく状態をすべて破棄する
    ///
    /// # Returns
    ///
    /// 接続が存在していた場合は `true`
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        let connected_at = state.connected_at(connection_id);
        let deliveries = state.disconnect(connection_id);
        if let Some(since) = connected_at.and_then(|at| timestamp_to_rfc3339(at.value())) {
            tracing::info!(
                "Connection '{}' torn down (connected since {})",
                connection_id,
                since
            );
        }
        self.message_pusher.unregister_client(connection_id).await;
        deliver(self.message_pusher.as_ref(), deliveries).await;
        connected_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, RoomName},
        usecase::{
            PresenceUseCase, RoomUseCase,
            test_support::{connect, create_test_message_pusher, create_test_state, drain_events},
        },
    };

    #[tokio::test]
    async fn test_disconnect_session_success() {
        // テスト項目: 切断で名前とルームが解放され、残りの接続に一覧が再送される
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let (alice, _alice_rx) = connect(&state, &pusher, "conn-a").await;
        let (_bob, mut bob_rx) = connect(&state, &pusher, "conn-b").await;
        let alice_name = DisplayName::new("alice".to_string()).unwrap();
        PresenceUseCase::new(state.clone(), pusher.clone())
            .register(alice.clone(), alice_name)
            .await;
        let call_room = RoomName::new("call-1".to_string()).unwrap();
        RoomUseCase::new(state.clone(), pusher.clone())
            .join(alice.clone(), call_room, None)
            .await;
        drain_events(&mut bob_rx);
        let usecase = DisconnectSessionUseCase::new(state.clone(), pusher.clone());

        // when (操作):
        let was_connected = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(was_connected);
        let events = drain_events(&mut bob_rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "users:update");
        assert_eq!(events[0]["data"]["users"], serde_json::json!([]));
        assert_eq!(events[1]["event"], "rooms:update");
        assert_eq!(events[1]["data"]["rooms"], serde_json::json!([]));

        let state = state.lock().await;
        assert!(!state.is_connected(&alice));
        assert!(state.list_room_names().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_nonexistent_session() {
        // テスト項目: 存在しない接続の切断は何もしない
        // given (前提条件):
        let state = create_test_state();
        let pusher = create_test_message_pusher();
        let (_bob, mut bob_rx) = connect(&state, &pusher, "conn-b").await;
        let usecase = DisconnectSessionUseCase::new(state.clone(), pusher);

        // when (操作):
        let ghost = ConnectionId::new("ghost".to_string()).unwrap();
        let was_connected = usecase.execute(&ghost).await;

        // then (期待する結果):
        assert!(!was_connected);
        assert!(drain_events(&mut bob_rx).is_empty());
    }
}
