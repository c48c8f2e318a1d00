//! User entity.

use crate::domain::foundation::{Timestamp, UserId};

/// A registered account.
///
/// `password` always holds a hash, never the clear-text secret. An empty
/// `token` means the user is logged out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub password: String,
    pub name: String,
    pub token: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Creates a freshly registered, logged-out user.
    pub fn register(id: UserId, name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            password: password_hash.into(),
            name: name.into(),
            token: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the session token.
    pub fn login(&mut self, token: impl Into<String>) {
        self.token = token.into();
        self.touch();
    }

    /// Clears the session token.
    pub fn logout(&mut self) {
        self.token.clear();
        self.touch();
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn change_password(&mut self, password_hash: impl Into<String>) {
        self.password = password_hash.into();
        self.touch();
    }

    /// True when a non-empty session token is held.
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    fn touch(&mut self) {
        let now = Timestamp::now();
        self.updated_at = if now > self.created_at { now } else { self.created_at };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::register(UserId::new("alice").unwrap(), "Alice", "$2b$04$hash")
    }

    #[test]
    fn registered_user_is_logged_out() {
        let user = test_user();
        assert!(!user.is_logged_in());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn login_then_logout_clears_token() {
        let mut user = test_user();
        user.login("token-1");
        assert!(user.is_logged_in());
        assert_eq!(user.token, "token-1");

        user.logout();
        assert!(!user.is_logged_in());
    }

    #[test]
    fn updates_never_move_updated_at_before_created_at() {
        let mut user = test_user();
        user.rename("Alice Cooper");
        assert!(user.updated_at >= user.created_at);
        assert_eq!(user.name, "Alice Cooper");
    }
}
