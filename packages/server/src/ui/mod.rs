//! WebSocket relay server: router, handlers and shutdown.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
