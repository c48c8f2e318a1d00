//! User domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, topics};

use super::User;

/// Announced on the `users` stream after a user mutation commits.
///
/// Carries the public fields only; the password hash and token stay private.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserEvent {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

domain_event!(UserEvent, topic = topics::USERS, id = id);

impl From<&User> for UserEvent {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            created_at: user.created_at.as_millis(),
            updated_at: user.updated_at.as_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, Identifiable, UserId};

    #[test]
    fn event_never_carries_secrets() {
        let mut user = User::register(UserId::new("bob").unwrap(), "Bob", "secret-hash");
        user.login("secret-token");

        let json = serde_json::to_string(&UserEvent::from(&user)).unwrap();

        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn event_is_keyed_by_user_id_and_bound_to_users_stream() {
        let user = User::register(UserId::new("bob").unwrap(), "Bob", "hash");
        let event = UserEvent::from(&user);

        assert_eq!(event.id(), "bob");
        assert_eq!(UserEvent::TOPIC, "users");
    }

    #[test]
    fn consumers_tolerate_unknown_and_missing_fields() {
        let event: UserEvent =
            serde_json::from_str(r#"{"id":"bob","nickname":"bobby"}"#).unwrap();

        assert_eq!(event.id, "bob");
        assert_eq!(event.name, "");
        assert_eq!(event.created_at, 0);
    }
}
