//! Shared Module
//!
//! Plain data types used by the backend and by API clients: chat rows and
//! request bodies, the event frames pushed over WebSocket sessions, the
//! notification document kept for offline recipients, configuration, and the
//! error type these produce.
//!
//! Nothing in here performs I/O except [`config::AppConfig::load`].

/// Chat, group and message types plus request/response bodies
pub mod chat;

/// Event frames pushed to live sessions
pub mod event;

/// Per-recipient notification documents
pub mod notification;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use chat::{Chat, ChatType, Group, Message, UserId};
pub use event::{ChatEvent, EventAction};
pub use notification::{NotificationDocument, NotificationEntry};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
