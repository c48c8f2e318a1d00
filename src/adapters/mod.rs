//! Adapters - Implementations of the ports.
//!
//! - `postgres` - Transactional persistence on PostgreSQL
//! - `memory` - In-memory unit of work for tests and local runs
//! - `events` - Typed producers, the consumer loop and log transports
//! - `security` - bcrypt password hashing
//! - `http` - axum REST API

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod security;
