use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::contact::{Contact, ContactDetails};

use super::validate_optional_email;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateContactRequest {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    #[validate(length(max = 200), custom(function = "validate_optional_email"))]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateContactRequest {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    #[validate(length(max = 200), custom(function = "validate_optional_email"))]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct GetContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub id: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct DeleteContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub id: String,
}

/// Query-string search; every filter is optional.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct SearchContactRequest {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: String,
    #[validate(range(min = 1))]
    pub page: u32,
    #[validate(range(min = 1, max = 100))]
    pub size: u32,
}

impl Default for SearchContactRequest {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            page: 1,
            size: 10,
        }
    }
}

macro_rules! contact_details {
    ($request:ident) => {
        impl $request {
            pub fn details(&self) -> ContactDetails {
                ContactDetails {
                    first_name: self.first_name.clone(),
                    last_name: self.last_name.clone(),
                    email: self.email.clone(),
                    phone: self.phone.clone(),
                }
            }
        }
    };
}

contact_details!(CreateContactRequest);
contact_details!(UpdateContactRequest);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Contact> for ContactResponse {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id.to_string(),
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

    fn create_request() -> CreateContactRequest {
        CreateContactRequest {
            user_id: "alice".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "0800".to_string(),
        }
    }

    #[test]
    fn valid_create_request_passes() {
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn first_name_is_required() {
        let request = CreateContactRequest {
            first_name: String::new(),
            ..create_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let request = CreateContactRequest {
            email: "nope".to_string(),
            ..create_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn overlong_phone_is_rejected() {
        let request = CreateContactRequest {
            phone: "1".repeat(21),
            ..create_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn search_defaults_to_first_page_of_ten() {
        let request: SearchContactRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.size, 10);
    }

    #[test]
    fn search_rejects_page_zero_and_oversized_pages() {
        let zero = SearchContactRequest {
            user_id: "alice".to_string(),
            page: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let huge = SearchContactRequest {
            user_id: "alice".to_string(),
            size: 101,
            ..Default::default()
        };
        assert!(huge.validate().is_err());
    }
}
