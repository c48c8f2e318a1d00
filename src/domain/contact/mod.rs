//! Contact module - address-book entries owned by a user.

mod entity;
mod events;

pub use entity::{Contact, ContactDetails};
pub use events::ContactEvent;
