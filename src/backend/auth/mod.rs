//! Authentication Module
//!
//! Tokens are issued by the CMS auth service; this crate only verifies them.
//! The subject claim carries the numeric user id that becomes the identity of
//! WebSocket sessions and the sender of chat messages.

/// Token verification
pub mod sessions;

pub use sessions::{verify_token, Claims};
