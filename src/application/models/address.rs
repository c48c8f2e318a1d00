use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::address::{Address, AddressDetails};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateAddressRequest {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub contact_id: String,
    #[validate(length(max = 255))]
    pub street: String,
    #[validate(length(max = 255))]
    pub city: String,
    #[validate(length(max = 255))]
    pub province: String,
    #[validate(length(max = 10))]
    pub postal_code: String,
    #[validate(length(max = 100))]
    pub country: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateAddressRequest {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub contact_id: String,
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(max = 255))]
    pub street: String,
    #[validate(length(max = 255))]
    pub city: String,
    #[validate(length(max = 255))]
    pub province: String,
    #[validate(length(max = 10))]
    pub postal_code: String,
    #[validate(length(max = 100))]
    pub country: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct GetAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub contact_id: String,
    #[validate(length(min = 1, max = 100))]
    pub id: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct DeleteAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub contact_id: String,
    #[validate(length(min = 1, max = 100))]
    pub id: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ListAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub contact_id: String,
}

macro_rules! address_details {
    ($request:ident) => {
        impl $request {
            pub fn details(&self) -> AddressDetails {
                AddressDetails {
                    street: self.street.clone(),
                    city: self.city.clone(),
                    province: self.province.clone(),
                    postal_code: self.postal_code.clone(),
                    country: self.country.clone(),
                }
            }
        }
    };
}

address_details!(CreateAddressRequest);
address_details!(UpdateAddressRequest);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressResponse {
    pub id: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Address> for AddressResponse {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
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
