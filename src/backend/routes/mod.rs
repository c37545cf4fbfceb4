//! Route Configuration Module
//!
//! - **`router`** - Main router creation, health check and layers
//! - **`chat_routes`** - WebSocket endpoint
//! - **`api_routes`** - `/v1` REST endpoints
//!
//! # Route Overview
//!
//! ## Realtime
//!
//! - `GET /ws?token=` - WebSocket session
//!
//! ## API
//!
//! - `/v1/group`, `/v1/group/{id}`, `/v1/group/user-groups/{id}`,
//!   `/v1/group/{id}/users/{user_id}`
//! - `/v1/user-chats/{id}`, `/v1/chat/{id}`
//! - `/v1/send-message`, `/v1/update-message`, `/v1/delete-message/{id}`,
//!   `/v1/chat-messages/{id}`
//! - `/v1/get-notifications/{id}`, `/v1/chat-notifications`

/// Main router creation
pub mod router;

/// WebSocket route
pub mod chat_routes;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
