use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::user::User;

/// The authenticated caller resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VerifyUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GetUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LogoutUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub id: String,
}

/// Partial update; empty fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateUserRequest {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            token: String::new(),
            created_at: user.created_at.as_millis(),
            updated_at: user.updated_at.as_millis(),
        }
    }
}

impl UserResponse {
    /// Response carrying the session token, returned by login only.
    pub fn with_token(user: &User) -> Self {
        Self {
            token: user.token.clone(),
            ..Self::from(user)
        }
    }
}
