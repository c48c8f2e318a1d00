//! Request and response models for the use cases.
//!
//! Requests carry declarative validation rules (`validator` derive); the use
//! case checks them inside its unit of work before touching the store.
//! Identifiers taken from the path or the authenticated session are never
//! read from a request body.

mod address;
mod contact;
mod user;

pub use address::{
    AddressResponse, CreateAddressRequest, DeleteAddressRequest, GetAddressRequest,
    ListAddressRequest, UpdateAddressRequest,
};
pub use contact::{
    ContactResponse, CreateContactRequest, DeleteContactRequest, GetContactRequest,
    SearchContactRequest, UpdateContactRequest,
};
pub use user::{
    Auth, GetUserRequest, LoginUserRequest, LogoutUserRequest, RegisterUserRequest,
    UpdateUserRequest, UserResponse, VerifyUserRequest,
};

/// Accepts an empty string, otherwise requires a well-formed email address.
pub(crate) fn validate_optional_email(value: &str) -> Result<(), validator::ValidationError> {
    use validator::ValidateEmail;

    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("email"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_email_accepts_empty_and_valid() {
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("jane@example.com").is_ok());
        assert!(validate_optional_email("not-an-email").is_err());
    }
}
