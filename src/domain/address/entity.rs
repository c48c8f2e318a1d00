//! Address entity.

use crate::domain::foundation::{AddressId, ContactId, Timestamp};

/// Editable fields of an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDetails {
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
}

/// A postal address attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: AddressId,
    pub contact_id: ContactId,
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Address {
    /// Creates a new address under `contact_id` with a generated id.
    pub fn new(contact_id: ContactId, details: AddressDetails) -> Self {
        let now = Timestamp::now();
        Self {
            id: AddressId::generate(),
            contact_id,
            street: details.street,
            city: details.city,
            province: details.province,
            postal_code: details.postal_code,
            country: details.country,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field.
    pub fn apply(&mut self, details: AddressDetails) {
        self.street = details.street;
        self.city = details.city;
        self.province = details.province;
        self.postal_code = details.postal_code;
        self.country = details.country;
        let now = Timestamp::now();
        self.updated_at = if now > self.created_at { now } else { self.created_at };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_address_is_attached_to_contact() {
        let contact_id = ContactId::from_string("c-1");
        let address = Address::new(
            contact_id.clone(),
            AddressDetails {
                street: "Main St".to_string(),
                ..Default::default()
            },
        );

        assert_eq!(address.contact_id, contact_id);
        assert_eq!(address.street, "Main St");
    }

    #[test]
    fn apply_replaces_all_fields() {
        let mut address = Address::new(ContactId::from_string("c-1"), AddressDetails::default());

        address.apply(AddressDetails {
            street: "Elm St".to_string(),
            city: "Springfield".to_string(),
            province: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
        });

        assert_eq!(address.city, "Springfield");
        assert_eq!(address.postal_code, "62701");
    }
}
