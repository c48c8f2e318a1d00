//! Contact domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, topics};

use super::Contact;

/// Announced on the `contacts` stream after a contact mutation commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactEvent {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: i64,
    pub updated_at: i64,
}

domain_event!(ContactEvent, topic = topics::CONTACTS, id = id);

impl From<&Contact> for ContactEvent {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id.to_string(),
            user_id: contact.user_id.to_string(),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            created_at: contact.created_at.as_millis(),
            updated_at: contact.updated_at.as_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::ContactDetails;
    use crate::domain::foundation::{DomainEvent, Identifiable, UserId};

    #[test]
    fn event_mirrors_contact_fields() {
        let contact = Contact::new(
            UserId::new("u1").unwrap(),
            ContactDetails {
                first_name: "Jane".to_string(),
                ..Default::default()
            },
        );

        let event = ContactEvent::from(&contact);

        assert_eq!(event.id(), contact.id.as_str());
        assert_eq!(event.user_id, "u1");
        assert_eq!(event.first_name, "Jane");
        assert_eq!(event.created_at, contact.created_at.as_millis());
        assert_eq!(ContactEvent::TOPIC, "contacts");
    }
}
