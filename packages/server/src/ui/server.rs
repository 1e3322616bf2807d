//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, RelayState},
    error::ServerError,
    usecase::{
        ChatUseCase, ConnectSessionUseCase, DisconnectSessionUseCase, MatchmakingUseCase,
        PresenceUseCase, RoomUseCase, SignalingUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, get_users, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Presence and signaling relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(config, relay_state, message_pusher);
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    app_state: Arc<AppState>,
}

impl Server {
    /// Wire the use cases around the shared relay state and the pusher.
    pub fn new(
        config: ServerConfig,
        relay_state: Arc<Mutex<RelayState>>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        let app_state = Arc::new(AppState {
            connect_session_usecase: Arc::new(ConnectSessionUseCase::new(
                relay_state.clone(),
                message_pusher.clone(),
            )),
            disconnect_session_usecase: Arc::new(DisconnectSessionUseCase::new(
                relay_state.clone(),
                message_pusher.clone(),
            )),
            presence_usecase: Arc::new(PresenceUseCase::new(
                relay_state.clone(),
                message_pusher.clone(),
            )),
            room_usecase: Arc::new(RoomUseCase::new(
                relay_state.clone(),
                message_pusher.clone(),
            )),
            chat_usecase: Arc::new(ChatUseCase::new(
                relay_state.clone(),
                message_pusher.clone(),
            )),
            matchmaking_usecase: Arc::new(MatchmakingUseCase::new(
                relay_state.clone(),
                message_pusher.clone(),
            )),
            signaling_usecase: Arc::new(SignalingUseCase::new(relay_state, message_pusher)),
            heartbeat: config.heartbeat,
            idle_timeout: config.idle_timeout,
        });

        Self { config, app_state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route(&self.config.ws_path, get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/users", get(get_users))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.app_state.clone())
    }

    /// Bind to the configured address and serve until a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let app = self.router();
        let local_addr = listener.local_addr().map_err(ServerError::Serve)?;

        tracing::info!("Relay server listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}{}", local_addr, self.config.ws_path);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
