//! Server Module
//!
//! Server initialization and configuration.
//!
//! - **`state`** - `AppState` and `FromRef` implementations
//! - **`config`** - Connecting the database and cache named in the config
//! - **`init`** - Building the application and starting the broadcast worker
//! - **`signal`** - Ctrl-C / SIGTERM future for graceful shutdown
//!
//! # Initialization Flow
//!
//! 1. **Collaborators**: database pool (optional) and cache (Redis or memory)
//! 2. **Hub**: registry plus broadcast worker under a cancellation token
//! 3. **Router**: all routes with tracing and CORS layers

/// Application state management
pub mod state;

/// Collaborator loading
pub mod config;

/// Server initialization
pub mod init;

pub mod signal;

// Re-export commonly used types
pub use state::AppState;
pub use init::{build_state, create_app, App};
pub use signal::shutdown_signal;
