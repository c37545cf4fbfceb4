//! Chat HTTP Handlers
//!
//! All handlers require a bearer token ([`AuthUser`](crate::backend::middleware::AuthUser))
//! and return `503` when no relational store is configured.
//!
//! - **`groups`** - group CRUD and membership
//! - **`messages`** - chats and messages
//! - **`notifications`** - notification documents

pub mod groups;
pub mod messages;
pub mod notifications;
