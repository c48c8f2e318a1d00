//! Domain event capability.
//!
//! An event is a flat record of an entity's public fields at the moment a
//! mutation committed. Events carry no envelope: the serialized record is the
//! whole message body, and the entity identifier is the message key.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Anything that carries a stable identifier.
pub trait Identifiable {
    /// The identifier used as the partition key.
    fn id(&self) -> &str;
}

/// An event announced on a destination stream.
///
/// Each event type is bound to exactly one stream for its whole life.
pub trait DomainEvent: Identifiable + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Destination stream (topic) name.
    const TOPIC: &'static str;
}

/// Destination stream names.
pub mod topics {
    pub const USERS: &str = "users";
    pub const CONTACTS: &str = "contacts";
    pub const ADDRESSES: &str = "addresses";

    /// Every stream the worker consumes.
    pub const ALL: [&str; 3] = [USERS, CONTACTS, ADDRESSES];
}

/// Implements [`Identifiable`] and [`DomainEvent`] for a flat event record.
///
/// ```ignore
/// domain_event!(UserEvent, topic = topics::USERS, id = id);
/// ```
#[macro_export]
macro_rules! domain_event {
    ($event_name:ident, topic = $topic:expr, id = $id_field:ident) => {
        impl $crate::domain::foundation::Identifiable for $event_name {
            fn id(&self) -> &str {
                &self.$id_field
            }
        }

        impl $crate::domain::foundation::DomainEvent for $event_name {
            const TOPIC: &'static str = $topic;
        }
    };
}

pub use crate::domain_event;
