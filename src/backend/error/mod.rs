//! Backend Error Module
//!
//! Error types used by handlers, the hub-facing services and the repository.
//! Every variant maps to an HTTP status and converts into a JSON response, so
//! handlers return `Result<_, BackendError>` and use `?` throughout.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Response Format
//!
//! ```json
//! { "message": "group not found" }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
