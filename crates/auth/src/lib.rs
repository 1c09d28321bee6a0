//! `bloglist-auth` — token and credential primitives.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! mint/verify bearer tokens and hash/verify passwords, nothing more.

pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtCodec, JwtCodec, TokenError};
pub use password::{DEFAULT_COST, PasswordError, hash_password, verify_password};
