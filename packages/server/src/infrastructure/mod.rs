//! Infrastructure layer: wire DTOs and the WebSocket transport.

pub mod dto;
pub mod message_pusher;
