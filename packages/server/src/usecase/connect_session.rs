//! UseCase: 接続の受付
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 接続 ID の登録と `connection:ready` の送信
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 異常系：同じ接続 ID での二重登録

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, RelayState};

use super::{delivery::deliver, error::ConnectError};

/// 接続受付のユースケース
pub struct ConnectSessionUseCase {
    /// 共有リレー状態
    state: Arc<Mutex<RelayState>>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectSessionUseCase {
    pub fn new(state: Arc<Mutex<RelayState>>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state,
            message_pusher,
        }
    }

    /// 接続を登録し、割り当てた ID を本人に通知する
    ///
    /// # Arguments
    ///
    /// * `connection_id` - サーバーが払い出した接続 ID
    /// * `sender` - この接続への送信チャンネル
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<(), ConnectError> {
        let mut state = self.state.lock().await;
        if state.is_connected(&connection_id) {
            return Err(ConnectError::DuplicateConnectionId(
                connection_id.into_string(),
            ));
        }

        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;
        let deliveries = state.connect(connection_id);
        deliver(self.message_pusher.as_ref(), deliveries).await;

        Ok(())
    }

    pub async fn count_connections(&self) -> usize {
        self.state.lock().await.connection_count()
    }
}
