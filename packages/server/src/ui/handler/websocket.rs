//! WebSocket connection handlers.

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, RelayCommand},
    infrastructure::dto::parse_client_frame,
    ui::state::AppState,
};

/// How long the writer may take to flush queued frames after teardown.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the outbound channel into the WebSocket sink.
///
/// Also sends a Ping every `heartbeat`. When the channel closes (the
/// connection was unregistered from the pusher) a Close frame is sent.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    heartbeat: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(heartbeat);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    };
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Reads frames from the client until it closes, errors, goes idle or asks
/// to disconnect.
async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) {
    loop {
        let msg = match tokio::time::timeout(state.idle_timeout, receiver.next()).await {
            Err(_) => {
                tracing::info!(
                    "Connection '{}' idle for {:?}, closing",
                    connection_id,
                    state.idle_timeout
                );
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
            Ok(Some(Ok(msg))) => msg,
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received from '{}': {}", connection_id, text.as_str());
                let command = match parse_client_frame(text.as_str()) {
                    Ok(command) => command,
                    Err(e) => {
                        tracing::warn!("Dropping frame from '{}': {}", connection_id, e);
                        continue;
                    }
                };
                if dispatch(&state, &connection_id, command).await.is_break() {
                    tracing::info!("Connection '{}' requested disconnect", connection_id);
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!("Ignoring binary frame from '{}'", connection_id);
            }
            Message::Ping(_) | Message::Pong(_) => {
                // liveness only; axum answers pings itself
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                break;
            }
        }
    }
}

/// Route one inbound command to its use case.
async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    command: RelayCommand,
) -> ControlFlow<()> {
    match command {
        RelayCommand::RegisterIdentity { name } => {
            state
                .presence_usecase
                .register(connection_id.clone(), name)
                .await
        }
        RelayCommand::ListUsers => state.presence_usecase.list_users(connection_id).await,
        RelayCommand::JoinRoom { room, name } => {
            state
                .room_usecase
                .join(connection_id.clone(), room, name)
                .await
        }
        RelayCommand::LeaveRoom { room } => state.room_usecase.leave(connection_id, &room).await,
        RelayCommand::ListRooms => state.room_usecase.list(connection_id).await,
        RelayCommand::Signal { to, kind, payload } => {
            state
                .signaling_usecase
                .relay(connection_id, &to, kind, payload)
                .await
        }
        RelayCommand::JoinChat { room } => {
            state
                .chat_usecase
                .join(connection_id.clone(), room)
                .await
        }
        RelayCommand::SendChat { room, text } => {
            state.chat_usecase.send(connection_id, room, text).await
        }
        RelayCommand::FindAnonymous(kind) => {
            state
                .matchmaking_usecase
                .find(connection_id.clone(), kind)
                .await
        }
        RelayCommand::LeaveAnonymous(kind) => {
            state.matchmaking_usecase.leave(connection_id, kind).await
        }
        RelayCommand::Invite { kind, to, room } => {
            state
                .presence_usecase
                .invite(connection_id, kind, &to, room)
                .await
        }
        RelayCommand::Disconnect => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();

    // Create a channel for this connection to receive outbound frames
    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state
        .connect_session_usecase
        .execute(connection_id.clone(), tx)
        .await
    {
        tracing::warn!("Rejecting connection: {}", e);
        return;
    }
    tracing::info!("Connection '{}' opened", connection_id);

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender, state.heartbeat);
    let mut recv_task = tokio::spawn(receive_loop(receiver, state.clone(), connection_id.clone()));

    // If any one of the tasks completes, stop reading
    let writer_finished = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => {
            recv_task.abort();
            true
        }
    };

    // Teardown unregisters the pusher channel, which lets the writer close the socket
    state
        .disconnect_session_usecase
        .execute(&connection_id)
        .await;
    tracing::info!("Connection '{}' closed", connection_id);

    if !writer_finished
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
            .await
            .is_err()
    {
        send_task.abort();
    }
}
