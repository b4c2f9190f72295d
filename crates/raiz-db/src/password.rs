//! # Password Hashing
//!
//! Argon2id with a random salt per user, stored as a PHC string.
//! Hashing is CPU-heavy; async callers go through `spawn_blocking`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{DbError, DbResult};

/// Hashes `password` into a PHC string.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Internal(format!("password hashing failed: {e}")))
}

/// Checks `password` against a stored PHC string.
///
/// A malformed stored hash is an internal error; a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, phc: &str) -> DbResult<bool> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| DbError::Internal(format!("stored password hash is invalid: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Async wrapper around [`hash_password`].
pub async fn hash_password_blocking(password: String) -> DbResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DbError::Internal(format!("hashing task failed: {e}")))?
}

/// Async wrapper around [`verify_password`].
pub async fn verify_password_blocking(password: String, phc: String) -> DbResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &phc))
        .await
        .map_err(|e| DbError::Internal(format!("verification task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let phc = hash_password("segredo123").unwrap();

        assert!(phc.starts_with("$argon2"));
        assert!(verify_password("segredo123", &phc).unwrap());
        assert!(!verify_password("outra", &phc).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("segredo123").unwrap(),
            hash_password("segredo123").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("x", "not-a-phc").is_err());
    }
}
