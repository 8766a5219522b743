//! Shared Module
//!
//! Types shared between the server and its clients: the WebSocket wire
//! envelope, notification records and inbox request/response bodies, and
//! validation errors. Everything here is plain serde data and compiles
//! without the `ssr` feature.

/// WebSocket wire messages
pub mod event;

/// Shared error types
pub mod error;

/// Notification records and inbox DTOs
pub mod notification;

/// Re-export commonly used types for convenience
pub use event::{message_types, ClientCommand, WsMessage};
pub use error::SharedError;
pub use notification::{
    ActorSummary, MarkAsReadRequest, MarkAsReadResponse, Notification, NotificationListResponse,
    NotificationQuery, NotificationResponse, NotificationType, Pagination, UnreadCountResponse,
};
