//! Real-time Delivery Module
//!
//! Live WebSocket connections, room membership and fan-out of server pushes.
//!
//! # Architecture
//!
//! - **`registry`** - The connection table and room index, mutated only by the dispatch loop
//! - **`dispatcher`** - The dispatch loop and its cloneable `Dispatcher` handle
//! - **`protocol`** - Decoding and handling of inbound client frames
//! - **`socket`** - The `/ws` upgrade endpoint and per-connection reader/writer tasks
//! - **`stats`** - Connection count endpoint
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── registry.rs   - ConnectionRegistry
//! ├── dispatcher.rs - Dispatcher and dispatch loop
//! ├── protocol.rs   - Inbound frame handling
//! ├── socket.rs     - WebSocket endpoint
//! └── stats.rs      - Introspection endpoint
//! ```
//!
//! # Ordering
//!
//! Registration, room changes and broadcasts are all commands on one queue,
//! handled by one task. Two commands submitted from the same task take
//! effect in submission order.
//!
//! # Example
//!
//! ```rust,no_run
//! use socialhub::backend::realtime::Dispatcher;
//! use socialhub::shared::message_types;
//!
//! # async fn example(user_id: uuid::Uuid) {
//! let (dispatcher, _loop) = Dispatcher::start();
//! dispatcher.broadcast_to_user(user_id, message_types::NOTIFICATION, serde_json::json!({}));
//! dispatcher.broadcast_to_room("video:42", "new_comment", serde_json::json!({ "id": 1 }));
//! # }
//! ```

pub mod registry;

pub mod dispatcher;

pub mod protocol;

pub mod socket;

pub mod stats;

pub use dispatcher::Dispatcher;
pub use registry::{BroadcastMessage, BroadcastTarget, ConnectionId, ConnectionRegistry};
pub use socket::ws_upgrade;
pub use stats::realtime_stats;
