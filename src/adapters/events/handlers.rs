//! Dispatch handlers for the three destination streams.
//!
//! Each handler decodes the message into its event type and logs it. No
//! further processing is attached yet; a decode failure is reported to the
//! consumer loop so the offset is not advanced.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::address::AddressEvent;
use crate::domain::contact::ContactEvent;
use crate::domain::foundation::{topics, DomainEvent};
use crate::domain::user::UserEvent;
use crate::ports::{ConsumerMessage, HandlerError, MessageHandler};

pub struct EventConsumer<E> {
    name: &'static str,
    _event: PhantomData<fn() -> E>,
}

pub type UserConsumer = EventConsumer<UserEvent>;
pub type ContactConsumer = EventConsumer<ContactEvent>;
pub type AddressConsumer = EventConsumer<AddressEvent>;

impl<E: DomainEvent> EventConsumer<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _event: PhantomData,
        }
    }

    /// Stream this handler decodes.
    pub fn topic(&self) -> &'static str {
        E::TOPIC
    }
}

#[async_trait]
impl<E: DomainEvent> MessageHandler for EventConsumer<E> {
    async fn consume(&self, message: &ConsumerMessage) -> Result<(), HandlerError> {
        let event: E = serde_json::from_slice(&message.value)?;

        tracing::info!(
            handler = self.name,
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            id = event.id(),
            "Received event"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Handler the worker runs for `topic`, if the stream is known.
pub fn handler_for_topic(topic: &str) -> Option<Arc<dyn MessageHandler>> {
    match topic {
        topics::USERS => Some(Arc::new(UserConsumer::new("UserConsumer"))),
        topics::CONTACTS => Some(Arc::new(ContactConsumer::new("ContactConsumer"))),
        topics::ADDRESSES => Some(Arc::new(AddressConsumer::new("AddressConsumer"))),
        _ => None,
    }
}
