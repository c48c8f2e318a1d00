//! Producer - Typed publisher bound to one destination stream.
//!
//! Serializes the event as a flat JSON object, keys the message by the
//! event's identifier and hands it to the shared [`LogProducer`]. One append
//! attempt per call, no buffering and no retry.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::address::AddressEvent;
use crate::domain::contact::ContactEvent;
use crate::domain::foundation::DomainEvent;
use crate::domain::user::UserEvent;
use crate::ports::{EventPublisher, LogProducer, PublishError};

pub struct Producer<E> {
    log: Arc<dyn LogProducer>,
    _event: PhantomData<fn(E)>,
}

pub type UserProducer = Producer<UserEvent>;
pub type ContactProducer = Producer<ContactEvent>;
pub type AddressProducer = Producer<AddressEvent>;

impl<E: DomainEvent> Producer<E> {
    pub fn new(log: Arc<dyn LogProducer>) -> Self {
        Self {
            log,
            _event: PhantomData,
        }
    }

    /// Destination stream this producer writes to.
    pub fn topic(&self) -> &'static str {
        E::TOPIC
    }
}

#[async_trait]
impl<E: DomainEvent> EventPublisher<E> for Producer<E> {
    async fn send(&self, event: &E) -> Result<(), PublishError> {
        let value = serde_json::to_vec(event)?;
        let position = self.log.send_message(E::TOPIC, event.id(), &value).await?;

        tracing::debug!(
            topic = E::TOPIC,
            partition = position.partition,
            offset = position.offset,
            key = event.id(),
            "Message sent"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::{partition_for, InMemoryEventLog};

    fn event(id: &str) -> UserEvent {
        UserEvent {
            id: id.to_string(),
            name: "Alice".to_string(),
            created_at: 1,
            updated_at: 2,
        }
    }

    #[tokio::test]
    async fn send_appends_keyed_json_to_bound_topic() {
        let log = Arc::new(InMemoryEventLog::new(4));
        let producer = UserProducer::new(log.clone());

        producer.send(&event("alice")).await.unwrap();

        let messages = log.messages("users");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].key.as_deref(), Some("alice"));
        assert_eq!(messages[0].partition, partition_for("alice", 4));
        let decoded: UserEvent = serde_json::from_slice(&messages[0].value).unwrap();
        assert_eq!(decoded, event("alice"));
    }

    #[tokio::test]
    async fn same_entity_lands_on_same_partition() {
        let log = Arc::new(InMemoryEventLog::new(8));
        let producer = UserProducer::new(log.clone());

        producer.send(&event("alice")).await.unwrap();
        producer.send(&event("alice")).await.unwrap();

        let messages = log.messages("users");
        assert_eq!(messages[0].partition, messages[1].partition);
        assert_eq!(messages[1].offset, messages[0].offset + 1);
    }

    #[tokio::test]
    async fn transport_failure_is_delivery_error() {
        let log = Arc::new(InMemoryEventLog::new(1));
        log.set_unavailable(true);
        let producer = UserProducer::new(log.clone());

        let err = producer.send(&event("alice")).await.unwrap_err();

        assert!(matches!(err, PublishError::Delivery(_)));
        assert_eq!(log.send_attempts(), 1);
        assert_eq!(log.sent_count(), 0);
    }

    #[test]
    fn producer_reports_its_topic() {
        let log = Arc::new(InMemoryEventLog::new(1));
        assert_eq!(ContactProducer::new(log.clone()).topic(), "contacts");
        assert_eq!(AddressProducer::new(log).topic(), "addresses");
    }
}
