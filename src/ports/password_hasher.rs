//! PasswordHasher port.
//!
//! Hashing is CPU-bound; implementations must not run it on the async
//! executor.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// One-way password hashing.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// # Errors
    ///
    /// - `HashingError` if the hash could not be computed
    async fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Returns `false` for a wrong password and for a malformed hash.
    async fn verify(&self, password: &str, hash: &str) -> bool;
}
