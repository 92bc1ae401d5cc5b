//! bcrypt hashing, moved off the async runtime.

use tokio::task::{spawn_blocking, JoinError};

/// Fewest characters a password may have at registration. Eight is not enough.
pub const MIN_PASSWORD_LENGTH: usize = 9;

/// Mirrors bcrypt's private cost bounds (bcrypt 0.17 `MIN_COST`/`MAX_COST`).
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(thiserror::Error, Debug)]
pub enum PasswordError {
    #[error("bcrypt failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Task(#[from] JoinError),
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, PasswordError> {
    Ok(spawn_blocking(move || bcrypt::hash(password, cost)).await??)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    Ok(spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}
