//! Shared Error Types
//!
//! Errors raised by the plain data types in `shared`: request validation and
//! (de)serialization of events and notification documents. The backend wraps
//! these in `BackendError` before they reach an HTTP response.
//!
//! # Usage
//!
//! ```rust
//! use cmshub::shared::chat::ChatType;
//! use cmshub::shared::error::SharedError;
//!
//! let error = "broadcast".parse::<ChatType>().unwrap_err();
//! assert!(matches!(error, SharedError::ValidationError { ref field, .. } if field == "chat_type"));
//! ```
use thiserror::Error;

/// Errors that can occur while building or decoding shared types
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
