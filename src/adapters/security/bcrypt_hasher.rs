//! bcrypt implementation of the PasswordHasher port.
//!
//! bcrypt is deliberately slow, so both operations run on the blocking pool.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::PasswordHasher;

/// Hashes passwords with bcrypt at a fixed cost.
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

fn hashing_error(message: String) -> DomainError {
    DomainError::new(ErrorCode::HashingError, message)
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| hashing_error(format!("Hashing task failed: {}", e)))?
            .map_err(|e| hashing_error(format!("Failed to hash password: {}", e)))
    }

    async fn verify(&self, password: &str, hash: &str) -> bool {
        let password = password.to_string();
        let hash = hash.to_string();

        match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
            Ok(verified) => verified.unwrap_or(false),
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(4)
    }

    #[tokio::test]
    async fn hash_verifies_against_the_plain_password() {
        let hash = hasher().hash("rahasia").await.unwrap();

        assert_ne!(hash, "rahasia");
        assert!(hasher().verify("rahasia", &hash).await);
        assert!(!hasher().verify("wrong", &hash).await);
    }

    #[tokio::test]
    async fn malformed_hash_does_not_verify() {
        assert!(!hasher().verify("rahasia", "not-a-bcrypt-hash").await);
    }

    #[tokio::test]
    async fn invalid_cost_is_a_hashing_error() {
        let err = BcryptPasswordHasher::new(1).hash("rahasia").await.unwrap_err();

        assert_eq!(err.code, ErrorCode::HashingError);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_does_not_stall_the_executor() {
        let ticker = tokio::spawn(async {
            let mut max_gap = Duration::ZERO;
            let mut last = Instant::now();
            for _ in 0..40 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                let now = Instant::now();
                max_gap = max_gap.max(now - last);
                last = now;
            }
            max_gap
        });
        tokio::task::yield_now().await;

        let hash = BcryptPasswordHasher::new(12).hash("rahasia").await.unwrap();
        let max_gap = ticker.await.unwrap();

        assert!(hash.starts_with("$2"));
        assert!(max_gap < Duration::from_millis(150), "executor stalled for {:?}", max_gap);
    }
}
