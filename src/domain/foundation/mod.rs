//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the event capability, pagination and
//! error types that form the vocabulary of the service.

mod errors;
mod events;
mod ids;
mod pagination;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{domain_event, topics, DomainEvent, Identifiable};
pub use ids::{AddressId, ContactId, UserId};
pub use pagination::{PageMetadata, PageRequest};
pub use timestamp::Timestamp;
