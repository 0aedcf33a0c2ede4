//! Password hashing with bcrypt. The salt and cost live inside the encoded
//! hash string, so verification needs nothing but the stored value.

use crate::error::{AppError, AppResult};

pub fn hash(plaintext: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, cost)
}

/// Hash of a random password, verified against when a login names an unknown
/// user so that path costs the same bcrypt work as a wrong password.
pub fn decoy_hash(cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(&hex::encode(rand::random::<[u8; 16]>()), cost)
}

/// Constant-time check of `plaintext` against a stored bcrypt hash.
/// A malformed hash is a failed verification, never an error.
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
}

/// [`hash`] on the blocking pool so bcrypt's cost doesn't stall async workers.
pub async fn hash_blocking_pool(plaintext: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash(&plaintext, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("hash failed: {}", e)))
}

pub async fn verify_blocking_pool(plaintext: String, stored_hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify(&plaintext, &stored_hash))
        .await
        .unwrap_or(false)
}
