//! Notifications Module
//!
//! Durable per-user notifications for social events, pushed live through
//! the realtime dispatcher.
//!
//! # Module Structure
//!
//! ```text
//! notifications/
//! ├── mod.rs       - Module exports and documentation
//! ├── store.rs     - NotificationStore trait and StoreError
//! ├── memory.rs    - In-memory store
//! ├── postgres.rs  - PostgreSQL store
//! ├── directory.rs - Resource owner and display name lookups
//! ├── service.rs   - Creation pipeline and inbox operations
//! ├── events.rs    - DomainEvent and the fire-and-forget Notifier
//! └── handlers.rs  - REST handlers
//! ```
//!
//! # Flow
//!
//! A domain service calls `Notifier::emit`. The event is queued on the
//! background pool, where `NotificationService` resolves the recipient,
//! persists the notification and asks the dispatcher to push it to the
//! recipient's live connections. Self-actions produce nothing.

pub mod store;

pub mod memory;

pub mod postgres;

pub mod directory;

pub mod service;

pub mod events;

pub mod handlers;

pub use directory::{Directory, MemoryDirectory, PgDirectory, ResourceKind, ResourceOwner};
pub use events::{DomainEvent, Notifier};
pub use memory::MemoryNotificationStore;
pub use postgres::PgNotificationStore;
pub use service::NotificationService;
pub use store::{NotificationStore, StoreError, StoreResult};
