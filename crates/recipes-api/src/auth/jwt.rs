//! JWT token issuance and verification
//!
//! Bearer tokens are HMAC-SHA256 signed and carry a numeric subject claim
//! plus an absolute expiry timestamp. There is no revocation: a token stays
//! valid until its expiry regardless of later account changes.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use recipes_core::AppConfig;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// JWT claims: `{sub: user_id, iat, exp}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - numeric user ID
    pub sub: i64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// Token issuance and verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode JWT: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// JWT configuration
///
/// Built once at startup from [`AppConfig`] and passed explicitly; the
/// request path never reads the environment.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
}

impl JwtConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            secret: config.auth.jwt_secret.clone(),
            ttl_secs: config.auth.token_ttl_secs,
        }
    }
}

/// Issue a signed token for the given user
pub fn issue_token(config: &JwtConfig, user_id: i64) -> Result<String, TokenError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + config.ttl_secs,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify a token's signature and expiry and extract its claims
///
/// Fails with [`TokenError::ExpiredToken`] when the current time is past
/// the embedded expiry, [`TokenError::InvalidSignature`] when the signature
/// does not match, and [`TokenError::InvalidToken`] for anything malformed.
pub fn verify_token(config: &JwtConfig, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // No clock leeway: a past expiry is past
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
