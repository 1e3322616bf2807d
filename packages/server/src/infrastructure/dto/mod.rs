//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event envelopes
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;

pub use conversion::{InboundError, parse_client_frame};
