//! User module - registered accounts and their session tokens.

mod entity;
mod events;

pub use entity::User;
pub use events::UserEvent;
