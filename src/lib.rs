//! cmshub - chat hub and notification fan-out for a CMS backend
//!
//! The crate owns the realtime side of the CMS: WebSocket sessions tagged with
//! a user identity, delivery of chat events to whoever is online, and a
//! per-recipient notification document for whoever is not. It also owns the
//! chat, group and message tables that delivery depends on.
//!
//! # Module Structure
//!
//! - **`shared`** - Serializable types, configuration and shared errors
//! - **`backend`** - Axum server, hub, cache, persistence and handlers
//!
//! # Usage
//!
//! ```rust,no_run
//! use cmshub::backend::server::init::create_app;
//! use cmshub::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(&config).await?;
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, app.router).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The connection registry is an `Arc<RwLock<..>>` inside a cloneable `Hub`
//! handle; no lock is held while sending to a connection queue. Every other
//! piece of shared state is either immutable or behind a trait object that is
//! `Send + Sync`.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
