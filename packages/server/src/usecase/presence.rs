//! UseCase: 名前登録・ユーザー一覧・招待
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 名前登録時のユーザー一覧ブロードキャスト
//! - 名前の付け替え（後勝ち）
//! - 名前宛ての招待の配送
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済みの名前への招待
//! - 異常系：未登録の名前への招待は破棄される

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisplayName, InviteKind, MessagePusher, RelayState, RoomName, UserDetail,
};

use super::delivery::deliver;

/// 名前登録と招待のユースケース
pub struct PresenceUseCase {
    state: Arc<Mutex<RelayState>>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl PresenceUseCase {
    pub fn new(state: Arc<Mutex<RelayState>>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state,
            message_pusher,
        }
    }

    /// 接続に表示名を紐づけ、全接続にユーザー一覧を送る
    pub async fn register(&self, connection_id: ConnectionId, name: DisplayName) {
        let mut state = self.state.lock().await;
        tracing::info!("Connection '{}' registered as '{}'", connection_id, name);
        let deliveries = state.register_identity(connection_id, name);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    /// 要求元にだけユーザー一覧を送る
    pub async fn list_users(&self, connection_id: &ConnectionId) {
        let state = self.state.lock().await;
        let deliveries = state.list_users(connection_id);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    /// 表示名宛てにビデオ通話／チャットの招待を送る
    pub async fn invite(
        &self,
        from: &ConnectionId,
        kind: InviteKind,
        to: &DisplayName,
        room: RoomName,
    ) {
        let state = self.state.lock().await;
        let deliveries = state.invite(from, kind, to, room);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    /// 登録済みユーザーのスナップショット（HTTP API 用）
    pub async fn users(&self) -> Vec<UserDetail> {
        self.state.lock().await.user_details()
    }
}
