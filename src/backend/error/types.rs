/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used by the notification service and the HTTP handlers
 * and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * - `NotFound` - a notification, resource or user lookup found nothing
 * - `Forbidden` - a user tried to modify a notification they do not own
 * - `Unauthorized` - the request carries no valid session token
 * - `SharedError` - request validation and wire decoding failures
 * - `Store` - persistence failures from a `NotificationStore` or `Directory`
 *
 * Transport failures on WebSocket connections are never turned into a
 * `BackendError`; the dispatcher unregisters the connection instead.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::backend::notifications::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use socialhub::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::forbidden("unauthorized to mark this notification");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Lookup found nothing
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Authenticated, but not allowed to touch this record
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable error message
        message: String,
    },

    /// Missing or invalid session
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message
        message: String,
    },

    /// Validation or wire decoding error from the shared module
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Persistence error
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BackendError {
    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new authorization error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `NotFound` - 404 Not Found
    /// - `Forbidden` - 403 Forbidden
    /// - `Unauthorized` - 401 Unauthorized
    /// - `SharedError` - 400 Bad Request, except serialization (500)
    /// - `Store` - 404 for a missing row, otherwise 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::ProtocolError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    ///
    /// Database failures are reported with a generic message so driver
    /// details never reach clients.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { message } => message.clone(),
            Self::Forbidden { message } => message.clone(),
            Self::Unauthorized { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::Store(StoreError::NotFound(what)) => format!("{} not found", what),
            Self::Store(_) => "Internal storage error".to_string(),
        }
    }

    /// True for lookups that found nothing, whichever layer reported it
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Store(StoreError::NotFound(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_message() {
        let error: BackendError = StoreError::NotFound("notification".to_string()).into();
        assert_eq!(error.message(), "notification not found");

        let protocol: BackendError = SharedError::protocol("bad frame").into();
        assert_eq!(protocol.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BackendError::not_found("notification").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BackendError::forbidden("nope").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(BackendError::unauthorized("no token").status_code(), StatusCode::UNAUTHORIZED);

        let validation: BackendError = SharedError::validation("limit", "too big").into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let missing: BackendError = StoreError::NotFound("topic".to_string()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert!(missing.is_not_found());
    }

    #[test]
    fn test_database_message_is_generic() {
        let error: BackendError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message(), "Internal storage error");
    }
}
