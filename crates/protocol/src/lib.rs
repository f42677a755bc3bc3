//! Zaplink Protocol
//!
//! Shared types for communication between the pairing server and dashboard
//! clients. These types are serialized as JSON over WebSocket; the REST
//! endpoints reuse the same record and status types.

use uuid::Uuid;

pub mod client;
pub mod server;
pub mod types;

pub use client::ClientMessage;
pub use server::ServerMessage;
pub use types::*;

/// Generate a new opaque unique ID
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
