//! Backend Module
//!
//! All server-side code: the Axum application, the chat hub, the
//! notification store and the chat persistence layer.
//!
//! # Architecture
//!
//! - **`server`** - Configuration loading, application state, initialization
//! - **`routes`** - Route configuration and router assembly
//! - **`hub`** - Connection registry, broadcast worker and per-connection pumps
//! - **`ws`** - WebSocket upgrade handler driving the pumps
//! - **`cache`** - Key-value cache abstraction (Redis or in-memory)
//! - **`notifications`** - Notification fallback store on top of the cache
//! - **`chat`** - Repository, delivery orchestration and REST handlers
//! - **`auth`** - Bearer token verification
//! - **`middleware`** - Request extractors
//! - **`error`** - Backend error type and its HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── hub/            - Registry, broadcast worker, pumps
//! ├── ws/             - WebSocket handler
//! ├── cache/          - Cache trait and implementations
//! ├── notifications/  - Notification fallback store
//! ├── chat/           - Chat persistence, delivery and handlers
//! ├── auth/           - Token verification
//! ├── middleware/     - Request extractors
//! └── error/          - Error types
//! ```
//!
//! # Delivery Flow
//!
//! A chat handler persists the message, resolves its targets and hands the
//! event to `chat::delivery`. Each target is pushed to every live connection
//! it has in the hub; a target with no live connection gets its notification
//! document updated instead.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Connection registry and broadcast channel
pub mod hub;

/// WebSocket session handler
pub mod ws;

/// Key-value cache abstraction
pub mod cache;

/// Notification fallback store
pub mod notifications;

/// Chat persistence, delivery and handlers
pub mod chat;

/// Backend error types
pub mod error;

/// Token verification
pub mod auth;

/// Request extractors
pub mod middleware;

/// Re-export commonly used types
pub use server::create_app;
pub use hub::Hub;
pub use error::BackendError;
