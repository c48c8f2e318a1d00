//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `UnitOfWorkFactory` / `UnitOfWork` - Scoped transaction with rollback by default
//! - `Repository<T>` - Keyed CRUD shared by every entity
//! - `UserRepository`, `ContactRepository`, `AddressRepository` - Entity-specific lookups
//!
//! ## Event Ports
//!
//! - `EventPublisher<E>` - Typed announcement bound to one destination stream
//! - `LogProducer` - Synchronous append to the partitioned log
//! - `ConsumerGroup` / `GroupSession` - Session-scoped group consumption
//! - `MessageHandler` - Per-stream processing invoked by the consumer loop
//!
//! ## Security Ports
//!
//! - `PasswordHasher` - One-way password hashing

mod event_log;
mod event_publisher;
mod password_hasher;
mod unit_of_work;

pub use event_log::{
    ConsumerGroup, ConsumerMessage, GroupSession, HandlerError, LogProducer, MessageHandler,
    RecordPosition, TransportError,
};
pub use event_publisher::{EventPublisher, PublishError};
pub use password_hasher::PasswordHasher;
pub use unit_of_work::{
    AddressRepository, ContactFilter, ContactRepository, Entity, Repository, UnitOfWork,
    UnitOfWorkFactory, UserRepository,
};
