//! WebSocket Sessions
//!
//! `GET /ws` upgrades to a WebSocket, registers the session in the hub under
//! the caller's user id and runs both pumps until one of them stops.

pub mod handler;

pub use handler::ws_handler;
