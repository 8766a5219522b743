//! Backend Module
//!
//! This module contains all server-side code for the SocialHub notification
//! core: an Axum HTTP server, a WebSocket endpoint with room membership, the
//! single-writer dispatch loop, and the notification pipeline.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, composition root
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`realtime`** - Connection registry, dispatch loop, `/ws` endpoint
//! - **`notifications`** - Stores, directory, service, domain events, handlers
//! - **`tasks`** - Bounded background pool for fire-and-forget work
//! - **`auth`** - Session token verification
//! - **`middleware`** - Request authentication
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── realtime/       - WebSocket delivery
//! ├── notifications/  - Notification pipeline and inbox
//! ├── tasks/          - Background task pool
//! ├── auth/           - Session tokens
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds cloneable handles only: the notification service, the
//! dispatcher, the notifier and the token secret. The connection registry is
//! never shared; it belongs to the dispatch loop.
//!
//! # Data Flow
//!
//! ```text
//! domain service ──emit──▶ Notifier ──▶ BackgroundTasks
//!                                           │
//!                                           ▼
//!                               NotificationService ──▶ NotificationStore
//!                                           │
//!                                           ▼
//!                               Dispatcher ──▶ dispatch loop ──▶ connection writers
//! ```
//!
//! # Error Handling
//!
//! - `BackendError` for request-facing errors, rendered as JSON
//! - `StoreError` for persistence
//! - Transport and background failures are logged, never returned

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time delivery
pub mod realtime;

/// Notification pipeline and inbox
pub mod notifications;

/// Background task pool
pub mod tasks;

/// Backend error types
pub mod error;

/// Session tokens
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use notifications::{DomainEvent, NotificationService, Notifier};
pub use realtime::Dispatcher;
pub use server::create_app;
