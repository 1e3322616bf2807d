//! Presence and signaling relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rendezvous-server
//! cargo run --bin rendezvous-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use rendezvous_server::{
    config::{
        DEFAULT_HEARTBEAT_SECS, DEFAULT_HOST, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_PORT,
        DEFAULT_WS_PATH, ServerConfig,
    },
    domain::RelayState,
    infrastructure::message_pusher::WebSocketMessagePusher,
    ui::Server,
};
use rendezvous_shared::logger::setup_logger;
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "rendezvous-server")]
#[command(about = "Presence, matchmaking and WebRTC signaling relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "RENDEZVOUS_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "RENDEZVOUS_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Path of the WebSocket endpoint
    #[arg(long, env = "RENDEZVOUS_WS_PATH", default_value = DEFAULT_WS_PATH)]
    ws_path: String,

    /// Seconds between pings sent to each client
    #[arg(long, env = "RENDEZVOUS_HEARTBEAT_SECS", default_value_t = DEFAULT_HEARTBEAT_SECS)]
    heartbeat_secs: u64,

    /// Seconds without any inbound frame before a connection is closed
    #[arg(long, env = "RENDEZVOUS_IDLE_TIMEOUT_SECS", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    idle_timeout_secs: u64,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        &[env!("CARGO_CRATE_NAME"), "rendezvous_shared"],
        &args.log_level,
    );

    let config = match ServerConfig::new(
        args.host,
        args.port,
        args.ws_path,
        args.heartbeat_secs,
        args.idle_timeout_secs,
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Relay state
    // 2. MessagePusher
    // 3. Server (wires the use cases)

    // 1. Create the relay state (in-memory, lost on restart)
    let relay_state = Arc::new(Mutex::new(RelayState::default()));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Create and run the server
    let server = Server::new(config, relay_state, message_pusher);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
