//! Authentication Module
//!
//! Session token handling. Accounts, signup and login belong to the account
//! service; this crate only verifies the tokens it issues.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs      - Module exports and documentation
//! └── sessions.rs - JWT creation and verification
//! ```
//!
//! # Security
//!
//! - Tokens are HS256 JWTs signed with `JWT_SECRET`
//! - `sub` holds the user id; `exp` is always checked
//! - Invalid tokens on REST routes return 401; on `/ws` they downgrade the
//!   connection to anonymous

/// JWT token management
pub mod sessions;

pub use sessions::{create_token, user_id_from_token, verify_token, AuthError, Claims};
