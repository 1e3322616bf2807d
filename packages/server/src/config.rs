//! Server configuration.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WS_PATH: &str = "/api/socket";
pub const DEFAULT_HEARTBEAT_SECS: u64 = 10;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Paths served by the HTTP API; the WebSocket endpoint may not shadow them.
const RESERVED_API_PATHS: [&str; 3] = ["/api/health", "/api/users", "/api/rooms"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("WebSocket path '{0}' must start with '/'")]
    RelativeWsPath(String),

    #[error("WebSocket path '{0}' collides with an HTTP API route")]
    ReservedWsPath(String),

    #[error("heartbeat interval must be greater than zero")]
    ZeroHeartbeat,

    #[error("idle timeout {idle_timeout_secs}s <= heartbeat {heartbeat_secs}s")]
    IdleTimeoutTooShort {
        idle_timeout_secs: u64,
        heartbeat_secs: u64,
    },
}

/// Validated runtime configuration of the relay server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub ws_path: String,
    /// Interval between WebSocket pings sent to each client
    pub heartbeat: Duration,
    /// A connection with no inbound frame for this long is closed
    pub idle_timeout: Duration,
}

impl ServerConfig {
    pub fn new(
        host: String,
        port: u16,
        ws_path: String,
        heartbeat_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        if !ws_path.starts_with('/') {
            return Err(ConfigError::RelativeWsPath(ws_path));
        }
        if is_reserved_path(ws_path.trim_end_matches('/')) {
            return Err(ConfigError::ReservedWsPath(ws_path));
        }
        if heartbeat_secs == 0 {
            return Err(ConfigError::ZeroHeartbeat);
        }
        if idle_timeout_secs <= heartbeat_secs {
            return Err(ConfigError::IdleTimeoutTooShort {
                idle_timeout_secs,
                heartbeat_secs,
            });
        }

        Ok(Self {
            host,
            port,
            ws_path,
            heartbeat: Duration::from_secs(heartbeat_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_reserved_path(path: &str) -> bool {
    RESERVED_API_PATHS
        .iter()
        .any(|reserved| path == *reserved || path.starts_with(&format!("{reserved}/")))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ws_path: DEFAULT_WS_PATH.to_string(),
            heartbeat: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}
