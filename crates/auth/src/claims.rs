use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bloglist_core::UserId;

/// Bearer token claims.
///
/// Timestamps are seconds since the Unix epoch, as in any JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity of the user the token was issued to.
    pub id: UserId,

    /// Username at issue time (informational only; `id` is authoritative).
    pub username: String,

    /// Issued-at.
    pub iat: i64,

    /// Expiration.
    pub exp: i64,
}

impl TokenClaims {
    pub fn issue(id: UserId, username: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id,
            username: username.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Tolerated clock skew (seconds) for tokens issued on another host.
///
/// Only applied to `iat`; expiry is exact.
pub const ISSUED_AT_LEEWAY_SECS: i64 = 60;

/// Deterministically validate the claim time window against `now`.
///
/// Signature verification happens in [`crate::jwt`]; this only looks at `iat`/`exp`.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + ISSUED_AT_LEEWAY_SECS < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
