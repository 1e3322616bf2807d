//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - `RelayEvent` を JSON にエンコードして送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成と書き込みは UI 層（`ui/handler/websocket.rs`）の書き込みタスクが行う。
//! この実装は送信チャンネルに JSON 文字列を積むだけで、ソケットには触れない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RelayEvent},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信チャンネル
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }

    fn encode(event: &RelayEvent) -> Result<String, MessagePushError> {
        let message = ServerMessage::from(event.clone());
        serde_json::to_string(&message).map_err(|e| MessagePushError::Encode(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RelayEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(event)?;
        let clients = self.clients.lock().await;

        let Some(sender) = clients.get(connection_id) else {
            return Err(MessagePushError::ClientNotFound(
                connection_id.as_str().to_string(),
            ));
        };
        sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &RelayEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            let Some(sender) = clients.get(target) else {
                tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                );
                continue;
            };
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = sender.send(content.clone()) {
                tracing::warn!("Failed to push message to connection '{}': {}", target, e);
            }
        }
        tracing::debug!("Broadcasted message to {} connection(s)", targets.len());

        Ok(())
    }
}
