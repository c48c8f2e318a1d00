//! Contact entity.

use crate::domain::foundation::{ContactId, Timestamp, UserId};

/// Editable fields of a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// An address-book entry owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Contact {
    /// Creates a new contact with a generated id.
    pub fn new(user_id: UserId, details: ContactDetails) -> Self {
        let now = Timestamp::now();
        Self {
            id: ContactId::generate(),
            user_id,
            first_name: details.first_name,
            last_name: details.last_name,
            email: details.email,
            phone: details.phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field.
    pub fn apply(&mut self, details: ContactDetails) {
        self.first_name = details.first_name;
        self.last_name = details.last_name;
        self.email = details.email;
        self.phone = details.phone;
        let now = Timestamp::now();
        self.updated_at = if now > self.created_at { now } else { self.created_at };
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
