//! Contact Hub - Users, contacts and addresses with announced changes.
//!
//! Every mutating operation runs in one transaction and, after commit,
//! publishes the entity's new state to a partitioned event log. A separate
//! worker consumes the three destination streams through consumer groups.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod startup;
