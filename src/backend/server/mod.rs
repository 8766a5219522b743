//! Server Module
//!
//! Server initialization and configuration.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Configuration loading and validation
//! - **`init`** - Composition root and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs   - Module exports and documentation
//! ├── state.rs - AppState and FromRef implementations
//! ├── config.rs - ServerConfig, ConfigError, database loading
//! └── init.rs  - create_app and App
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::load()`
//! 2. **Storage**: Postgres when reachable, in-memory otherwise
//! 3. **Services**: dispatch loop, background pool, notification service
//! 4. **Router Creation**: routes, tracing and CORS layers
//!
//! # Example
//!
//! ```rust,no_run
//! use socialhub::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::load()?).await;
//! // axum::serve(listener, app.router.clone()).await?;
//! app.shutdown().await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::{create_app, create_app_with, App};
pub use state::AppState;
