//! Salted password hashing (bcrypt).
//!
//! Both functions are CPU-bound; async callers should run them on a blocking thread.

use thiserror::Error;

/// Default bcrypt work factor.
pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_verifies_original_password_only() {
        let hash = hash_password("sekret", TEST_COST).unwrap();

        assert_ne!(hash, "sekret");
        assert!(verify_password("sekret", &hash).unwrap());
        assert!(!verify_password("salainen", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("sekret", TEST_COST).unwrap();
        let b = hash_password("sekret", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_cost_is_an_error() {
        assert!(hash_password("sekret", 2).is_err());
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        assert!(verify_password("sekret", "not-a-bcrypt-hash").is_err());
    }
}
