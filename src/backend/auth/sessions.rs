/**
 * Session Tokens
 *
 * JWT issuing and verification for user sessions. Tokens are signed with
 * HS256 using the configured `JWT_SECRET`; `sub` carries the user id.
 * Issuing lives with the account service; this crate only needs it for
 * tests and tooling.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default lifetime of an issued token: 30 days
pub const TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Username, when the issuer included it
    #[serde(default)]
    pub username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token rejected: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("invalid user id in token: {0}")]
    InvalidSubject(String),
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Create a signed token for `user_id` that expires after `ttl_secs`
pub fn create_token(
    secret: &str,
    user_id: Uuid,
    username: Option<String>,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let now = now_secs();
    let claims = Claims {
        sub: user_id.to_string(),
        username,
        exp: now + ttl_secs,
        iat: now,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Verify signature and expiry, returning the claims
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}

/// Verify a token and parse its subject as a user id
pub fn user_id_from_token(secret: &str, token: &str) -> Result<Uuid, AuthError> {
    let claims = verify_token(secret, token)?;
    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject(claims.sub))
}
