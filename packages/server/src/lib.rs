//! Real-time presence and signaling relay.
//!
//! Tracks which users are online, groups connections into rooms, pairs
//! strangers for anonymous chat or video, and relays WebRTC call-setup
//! messages between peers over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod error;
