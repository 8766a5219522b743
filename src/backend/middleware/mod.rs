//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! # Architecture
//!
//! - **`auth`** - Bearer-token authentication for the notification routes
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::middleware;
//! use socialhub::backend::middleware::auth_middleware;
//!
//! // let protected = routes.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;

pub use auth::{auth_middleware, bearer_token, AuthUser, AuthenticatedUser};
