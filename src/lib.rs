//! SocialHub - Notification and Realtime Core
//!
//! SocialHub is the notification fan-out and WebSocket broadcast subsystem of a
//! social platform backend (forums, topics, short videos, likes, comments and
//! follows). It turns domain writes into persisted notifications and pushes
//! them to every live session of the recipient.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared by the server and by clients
//!   - Wire message envelope for the WebSocket protocol
//!   - Notification records, query parameters and response bodies
//!   - Validation error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Connection registry and the single-writer dispatch loop
//!   - Room membership protocol and the `/ws` endpoint
//!   - Notification pipeline, inbox service and REST handlers
//!   - Background task pool for fire-and-forget side effects
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the
//!   `socialhub-server` binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use socialhub::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load()?;
//! let app = create_app(config).await;
//! let router = app.router.clone();
//! // serve `router`, then `app.shutdown().await` on exit
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The connection registry is owned by exactly one task (the dispatch loop);
//!   every other task talks to it through a command channel.
//! - Read-only introspection (connection counts) goes through a snapshot
//!   behind a short-held `RwLock`.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
