//! UseCase: テキストチャット
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - チャットルーム参加と `chat:joined`
//! - メッセージがルームの全メンバー（送信者を含む）に届くこと
//! - 匿名公開ルームの人数通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：DM ルームでの送受信
//! - エッジケース：ルーム外の接続には届かない

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ChatText, ConnectionId, MessagePusher, RelayState, RoomName};

use super::delivery::deliver;

/// テキストチャットのユースケース
pub struct ChatUseCase {
    state: Arc<Mutex<RelayState>>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ChatUseCase {
    pub fn new(state: Arc<Mutex<RelayState>>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state,
            message_pusher,
        }
    }

    pub async fn join(&self, connection_id: ConnectionId, room: RoomName) {
        let mut state = self.state.lock().await;
        let deliveries = state.join_chat(connection_id, room);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }

    /// ルームの現メンバーにメッセージを配信する（保存はしない）
    pub async fn send(&self, connection_id: &ConnectionId, room: RoomName, text: ChatText) {
        let state = self.state.lock().await;
        let deliveries = state.send_chat(connection_id, room, text);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }
}
