//! Domain layer containing entities, events and shared value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, pagination, errors, event capability)
//! - `user` - Registered accounts and session tokens
//! - `contact` - Address-book entries owned by a user
//! - `address` - Postal addresses attached to a contact

pub mod address;
pub mod contact;
pub mod foundation;
pub mod user;
