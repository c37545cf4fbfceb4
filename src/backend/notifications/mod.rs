//! Notification Fallback Store
//!
//! When a chat event cannot be pushed to a recipient over a live connection,
//! the recipient's notification document is updated instead. The document
//! lives in the cache under `notifications:{user_id}` with no expiry and is
//! read back by `GET /v1/get-notifications/{id}`.

pub mod store;

pub use store::{notification_key, NotificationStore};
