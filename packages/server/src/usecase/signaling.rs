//! UseCase: WebRTC シグナリングの中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - offer / answer / ICE candidate が送信者 ID 付きで宛先にだけ届くこと
//! - ペイロードが加工されずに転送されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：x → y の offer
//! - 異常系：切断済みの宛先への送信は破棄される

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, RelayState, SignalKind, SignalPayload};

use super::delivery::deliver;

/// シグナリング中継のユースケース
pub struct SignalingUseCase {
    state: Arc<Mutex<RelayState>>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SignalingUseCase {
    pub fn new(state: Arc<Mutex<RelayState>>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state,
            message_pusher,
        }
    }

    pub async fn relay(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        kind: SignalKind,
        payload: SignalPayload,
    ) {
        let state = self.state.lock().await;
        let deliveries = state.relay_signal(from, to, kind, payload);
        deliver(self.message_pusher.as_ref(), deliveries).await;
    }
}
