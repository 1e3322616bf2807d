//! Utilities shared by the Rendezvous relay binaries and their tests.

pub mod logger;
pub mod time;
