//! Chat Module
//!
//! Chats, groups and messages: storage, delivery of the events they produce,
//! and the REST handlers in front of them.
//!
//! # Module Structure
//!
//! ```text
//! chat/
//! ├── mod.rs         - Module exports and documentation
//! ├── repository.rs  - ChatRepository trait and column whitelist
//! ├── db.rs          - Postgres implementation
//! ├── delivery.rs    - Live push or notification fallback per recipient
//! ├── service.rs     - Target resolution and message operations
//! └── handlers/      - REST handlers
//! ```

/// Storage interface
pub mod repository;

/// Postgres storage
pub mod db;

/// Event delivery
pub mod delivery;

/// Message operations
pub mod service;

/// HTTP handlers
pub mod handlers;

pub use db::PgChatRepository;
pub use delivery::{Delivery, DeliveryReport};
pub use repository::ChatRepository;
pub use service::ChatService;
