//! In-memory store adapter.
//!
//! Implements the unit-of-work ports over process memory. Useful for testing
//! and local development.

mod unit_of_work;

pub use unit_of_work::{InMemoryStore, InMemoryUnitOfWork, StoreSnapshot};
