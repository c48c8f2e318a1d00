//! EventPublisher port - Typed announcement of committed mutations.
//!
//! One publisher is permanently bound to one event type, and through
//! [`DomainEvent::TOPIC`] to one destination stream.

use async_trait::async_trait;
use thiserror::Error;

use super::TransportError;
use crate::domain::foundation::DomainEvent;

/// Failure to announce an event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be serialized. No send was attempted.
    #[error("failed to encode event: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The log did not accept the message.
    #[error("failed to deliver event: {0}")]
    Delivery(#[from] TransportError),
}

/// Port for announcing events of type `E`.
///
/// Implementations perform exactly one append attempt per call and never
/// retry. Callers own idempotency.
#[async_trait]
pub trait EventPublisher<E: DomainEvent>: Send + Sync {
    async fn send(&self, event: &E) -> Result<(), PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserEvent;

    #[test]
    fn event_publisher_is_object_safe() {
        fn _accepts_dyn(_p: &dyn EventPublisher<UserEvent>) {}
    }

    #[test]
    fn delivery_error_wraps_transport_error() {
        let err = PublishError::from(TransportError::Unavailable("refused".into()));
        assert!(matches!(err, PublishError::Delivery(_)));
        assert!(err.to_string().contains("refused"));
    }
}
