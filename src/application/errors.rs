//! Use case error taxonomy.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::PublishError;

/// Failure of a use case operation.
///
/// The HTTP layer maps each variant to one status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseCaseError {
    /// Bad input shape.
    #[error("{0}")]
    Validation(String),

    /// Referenced entity absent or not owned by the caller.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Store or transport failure after the input was accepted.
    #[error("{0}")]
    Persistence(String),

    /// Event payload could not be serialized.
    #[error("{0}")]
    Encoding(String),
}

impl UseCaseError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{} not found", resource))
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}

impl From<validator::ValidationErrors> for UseCaseError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<DomainError> for UseCaseError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => Self::Validation(err.message),
            ErrorCode::UserNotFound => Self::not_found("user"),
            ErrorCode::ContactNotFound => Self::not_found("contact"),
            ErrorCode::AddressNotFound => Self::not_found("address"),
            ErrorCode::UserAlreadyExists => Self::Conflict(err.message),
            ErrorCode::DatabaseError | ErrorCode::HashingError | ErrorCode::InternalError => {
                Self::Persistence(err.message)
            }
        }
    }
}

/// A delivery failure after commit is reported as a persistence failure even
/// though the write is durable.
impl From<PublishError> for UseCaseError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Encoding(e) => Self::Encoding(format!("failed to encode event: {}", e)),
            PublishError::Delivery(e) => Self::Persistence(format!("failed to publish event: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TransportError;

    #[test]
    fn delivery_failure_becomes_persistence() {
        let err: UseCaseError = PublishError::Delivery(TransportError::Closed).into();
        assert!(matches!(err, UseCaseError::Persistence(_)));
    }

    #[test]
    fn encoding_failure_stays_encoding() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: UseCaseError = PublishError::Encoding(json_err).into();
        assert!(matches!(err, UseCaseError::Encoding(_)));
    }

    #[test]
    fn domain_codes_map_to_variants() {
        let not_found: UseCaseError = DomainError::new(ErrorCode::ContactNotFound, "x").into();
        assert_eq!(not_found, UseCaseError::NotFound("contact not found".to_string()));

        let conflict: UseCaseError = DomainError::new(ErrorCode::UserAlreadyExists, "taken").into();
        assert_eq!(conflict, UseCaseError::Conflict("taken".to_string()));

        let db: UseCaseError = DomainError::database("boom").into();
        assert_eq!(db, UseCaseError::Persistence("boom".to_string()));
    }
}
