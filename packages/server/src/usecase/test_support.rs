//! UseCase テスト用のヘルパー

use std::{collections::HashMap, sync::Arc};

use rendezvous_shared::time::FixedClock;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ConnectionId, RelayState},
    infrastructure::message_pusher::WebSocketMessagePusher,
};

use super::ConnectSessionUseCase;

pub(crate) const TEST_NOW_MILLIS: i64 = 1_700_000_000_000;

pub(crate) fn create_test_state() -> Arc<Mutex<RelayState>> {
    Arc::new(Mutex::new(RelayState::new(Arc::new(FixedClock::new(
        TEST_NOW_MILLIS,
    )))))
}

pub(crate) fn create_test_message_pusher() -> Arc<WebSocketMessagePusher> {
    Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
        HashMap::new(),
    ))))
}

/// 接続を登録し、`connection:ready` を読み捨てた受信側を返す
pub(crate) async fn connect(
    state: &Arc<Mutex<RelayState>>,
    message_pusher: &Arc<WebSocketMessagePusher>,
    id: &str,
) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
    let connection_id = ConnectionId::new(id.to_string()).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    ConnectSessionUseCase::new(state.clone(), message_pusher.clone())
        .execute(connection_id.clone(), tx)
        .await
        .unwrap();
    drain_events(&mut rx);
    (connection_id, rx)
}

/// 受信済みのフレームをすべて JSON として取り出す
pub(crate) fn drain_events(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).unwrap());
    }
    events
}

/// 受信済みフレームのイベント名だけを取り出す
pub(crate) fn drain_event_names(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    drain_events(rx)
        .into_iter()
        .map(|event| event["event"].as_str().unwrap_or_default().to_string())
        .collect()
}
