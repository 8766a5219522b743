//! Shared Error Types
//!
//! Errors that can be produced while decoding wire messages or validating
//! inbox requests. They carry no transport concerns, so both the server and
//! clients can use them.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON encoding/decoding failures
//! - `ValidationError` - A request field is out of range or malformed
//! - `ProtocolError` - A WebSocket frame is well-formed JSON but unusable
//!
//! # Usage
//!
//! ```rust
//! use socialhub::shared::error::SharedError;
//!
//! let error = SharedError::validation("limit", "must be between 1 and 100");
//! assert!(error.to_string().contains("limit"));
//! ```
use thiserror::Error;

/// Shared error types that can occur in both server and client code
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Request validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Wire protocol error (missing or mistyped data in a frame)
    #[error("Protocol error: {message}")]
    ProtocolError {
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

    /// Create a new protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
