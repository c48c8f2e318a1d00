//! Address domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, topics};

use super::Address;

/// Announced on the `addresses` stream after an address mutation commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressEvent {
    pub id: String,
    pub contact_id: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: i64,
    pub updated_at: i64,
}

domain_event!(AddressEvent, topic = topics::ADDRESSES, id = id);

impl From<&Address> for AddressEvent {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            contact_id: address.contact_id.to_string(),
            street: address.street.clone(),
            city: address.city.clone(),
            province: address.province.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            created_at: address.created_at.as_millis(),
            updated_at: address.updated_at.as_millis(),
        }
    }
}
