//! Address module - postal addresses attached to a contact.

mod entity;
mod events;

pub use entity::{Address, AddressDetails};
pub use events::AddressEvent;
