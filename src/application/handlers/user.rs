//! UserUseCase - Registration, session tokens and profile updates.

use std::sync::Arc;

use uuid::Uuid;

use super::{announce, begin, commit, not_found, store_error, validate, OptionalPublisher};
use crate::application::models::{
    Auth, GetUserRequest, LoginUserRequest, LogoutUserRequest, RegisterUserRequest,
    UpdateUserRequest, UserResponse, VerifyUserRequest,
};
use crate::application::UseCaseError;
use crate::domain::foundation::UserId;
use crate::domain::user::{User, UserEvent};
use crate::ports::{PasswordHasher, UnitOfWorkFactory};

pub struct UserUseCase {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    hasher: Arc<dyn PasswordHasher>,
    publisher: OptionalPublisher<UserEvent>,
}

impl UserUseCase {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        hasher: Arc<dyn PasswordHasher>,
        publisher: OptionalPublisher<UserEvent>,
    ) -> Self {
        Self {
            uow_factory,
            hasher,
            publisher,
        }
    }

    /// Resolve a session token to the user holding it.
    pub async fn verify(&self, request: VerifyUserRequest) -> Result<Auth, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;

        let user = uow
            .users()
            .find_by_token(&request.token)
            .await
            .map_err(store_error("find user by token"))?
            .ok_or_else(not_found("user"))?;

        commit(uow).await?;

        Ok(Auth {
            id: user.id.to_string(),
        })
    }

    pub async fn create(&self, request: RegisterUserRequest) -> Result<UserResponse, UseCaseError> {
        validate(&request)?;
        let user_id = parse_user_id(&request.id)?;
        let password = self.hash_password(&request.password).await?;

        let mut uow = begin(self.uow_factory.as_ref()).await?;
        let total = uow
            .users()
            .count_by_id(&user_id)
            .await
            .map_err(store_error("count user by id"))?;
        if total > 0 {
            tracing::warn!(user_id = %user_id, "User already exists");
            return Err(UseCaseError::Conflict("user already exists".to_string()));
        }

        let user = User::register(user_id, request.name, password);

        uow.users()
            .create(&user)
            .await
            .map_err(store_error("create user"))?;

        commit(uow).await?;
        announce(&self.publisher, UserEvent::from(&user), "user created").await?;

        Ok(UserResponse::from(&user))
    }

    /// Check credentials and issue a fresh session token.
    pub async fn login(&self, request: LoginUserRequest) -> Result<UserResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = parse_user_id(&request.id)?;

        let mut user = uow
            .users()
            .find_by_id(&user_id)
            .await
            .map_err(store_error("find user by id"))?
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Login attempt for unknown user");
                UseCaseError::Unauthorized("username or password is wrong".to_string())
            })?;

        if !self.hasher.verify(&request.password, &user.password).await {
            tracing::warn!(user_id = %user_id, "Login attempt with wrong password");
            return Err(UseCaseError::Unauthorized(
                "username or password is wrong".to_string(),
            ));
        }

        user.login(Uuid::new_v4().to_string());

        uow.users()
            .update(&user)
            .await
            .map_err(store_error("save user"))?;

        commit(uow).await?;
        announce(&self.publisher, UserEvent::from(&user), "user login").await?;

        Ok(UserResponse::with_token(&user))
    }

    pub async fn current(&self, request: GetUserRequest) -> Result<UserResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = parse_user_id(&request.id)?;

        let user = uow
            .users()
            .find_by_id(&user_id)
            .await
            .map_err(store_error("find user by id"))?
            .ok_or_else(not_found("user"))?;

        commit(uow).await?;

        Ok(UserResponse::from(&user))
    }

    /// Clear the session token.
    pub async fn logout(&self, request: LogoutUserRequest) -> Result<bool, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = parse_user_id(&request.id)?;

        let mut user = uow
            .users()
            .find_by_id(&user_id)
            .await
            .map_err(store_error("find user by id"))?
            .ok_or_else(not_found("user"))?;

        user.logout();

        uow.users()
            .update(&user)
            .await
            .map_err(store_error("save user"))?;

        commit(uow).await?;
        announce(&self.publisher, UserEvent::from(&user), "user logout").await?;

        Ok(true)
    }

    /// Apply the non-empty fields of the request.
    pub async fn update(&self, request: UpdateUserRequest) -> Result<UserResponse, UseCaseError> {
        validate(&request)?;
        let user_id = parse_user_id(&request.id)?;
        let password = match request.password.as_str() {
            "" => None,
            password => Some(self.hash_password(password).await?),
        };

        let mut uow = begin(self.uow_factory.as_ref()).await?;
        let mut user = uow
            .users()
            .find_by_id(&user_id)
            .await
            .map_err(store_error("find user by id"))?
            .ok_or_else(not_found("user"))?;

        if !request.name.is_empty() {
            user.rename(request.name);
        }
        if let Some(password) = password {
            user.change_password(password);
        }

        uow.users()
            .update(&user)
            .await
            .map_err(store_error("save user"))?;

        commit(uow).await?;
        announce(&self.publisher, UserEvent::from(&user), "user updated").await?;

        Ok(UserResponse::from(&user))
    }

    async fn hash_password(&self, password: &str) -> Result<String, UseCaseError> {
        self.hasher.hash(password).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            UseCaseError::persistence("failed to hash password")
        })
    }
}

fn parse_user_id(id: &str) -> Result<UserId, UseCaseError> {
    UserId::new(id).map_err(|e| {
        tracing::warn!(error = %e, "Failed to validate user id");
        UseCaseError::validation(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::{InMemoryEventLog, Producer};
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::DomainError;

    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct PrefixHasher;

    #[async_trait]
    impl PasswordHasher for PrefixHasher {
        async fn hash(&self, password: &str) -> Result<String, DomainError> {
            Ok(format!("hashed:{}", password))
        }

        async fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("hashed:{}", password)
        }
    }

    /// Records, for every hash, whether the store could start a new unit of
    /// work at that moment. The in-memory unit of work holds the store lock,
    /// so an open one makes `begin` wait.
    struct StoreCheckingHasher {
        store: InMemoryStore,
        store_free: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl PasswordHasher for StoreCheckingHasher {
        async fn hash(&self, password: &str) -> Result<String, DomainError> {
            let free = tokio::time::timeout(Duration::from_millis(100), self.store.begin())
                .await
                .is_ok();
            self.store_free.lock().unwrap().push(free);
            Ok(format!("hashed:{}", password))
        }

        async fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("hashed:{}", password)
        }
    }

    fn use_case(store: &InMemoryStore, log: &Arc<InMemoryEventLog>) -> UserUseCase {
        UserUseCase::new(
            Arc::new(store.clone()),
            Arc::new(PrefixHasher),
            Some(Arc::new(Producer::<UserEvent>::new(log.clone()))),
        )
    }

    fn register(id: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            id: id.to_string(),
            password: "secret".to_string(),
            name: "Alice".to_string(),
        }
    }

    #[tokio::test]
    async fn create_hashes_password_and_publishes() {
        let store = InMemoryStore::new();
        let log = Arc::new(InMemoryEventLog::new(3));
        let use_case = use_case(&store, &log);

        let response = use_case.create(register("alice")).await.unwrap();

        assert_eq!(response.id, "alice");
        assert!(response.token.is_empty());
        let stored = store.snapshot().await.users;
        assert_eq!(stored[0].password, "hashed:secret");
        assert_eq!(log.sent_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_without_publishing() {
        let store = InMemoryStore::new();
        let log = Arc::new(InMemoryEventLog::new(3));
        let use_case = use_case(&store, &log);
        use_case.create(register("alice")).await.unwrap();

        let err = use_case.create(register("alice")).await.unwrap_err();

        assert!(matches!(err, UseCaseError::Conflict(_)));
        assert_eq!(log.sent_count(), 1);
    }

    #[tokio::test]
    async fn login_issues_token_that_verifies() {
        let store = InMemoryStore::new();
        let log = Arc::new(InMemoryEventLog::new(3));
        let use_case = use_case(&store, &log);
        use_case.create(register("alice")).await.unwrap();

        let session = use_case
            .login(LoginUserRequest {
                id: "alice".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        let auth = use_case
            .verify(VerifyUserRequest {
                token: session.token.clone(),
            })
            .await
            .unwrap();

        assert!(!session.token.is_empty());
        assert_eq!(auth.id, "alice");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let store = InMemoryStore::new();
        let log = Arc::new(InMemoryEventLog::new(3));
        let use_case = use_case(&store, &log);
        use_case.create(register("alice")).await.unwrap();

        let err = use_case
            .login(LoginUserRequest {
                id: "alice".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let store = InMemoryStore::new();
        let log = Arc::new(InMemoryEventLog::new(3));
        let use_case = use_case(&store, &log);
        use_case.create(register("alice")).await.unwrap();
        let session = use_case
            .login(LoginUserRequest {
                id: "alice".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        use_case
            .logout(LogoutUserRequest {
                id: "alice".to_string(),
            })
            .await
            .unwrap();

        let err = use_case
            .verify(VerifyUserRequest {
                token: session.token,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_only_touches_non_empty_fields() {
        let store = InMemoryStore::new();
        let log = Arc::new(InMemoryEventLog::new(3));
        let use_case = use_case(&store, &log);
        use_case.create(register("alice")).await.unwrap();

        let response = use_case
            .update(UpdateUserRequest {
                id: "alice".to_string(),
                name: "Alice Liddell".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(response.name, "Alice Liddell");
        let stored = store.snapshot().await.users;
        assert_eq!(stored[0].password, "hashed:secret");
    }

    #[tokio::test]
    async fn password_is_hashed_before_the_unit_of_work_opens() {
        let store = InMemoryStore::new();
        let hasher = Arc::new(StoreCheckingHasher {
            store: store.clone(),
            store_free: Mutex::new(Vec::new()),
        });
        let use_case = UserUseCase::new(Arc::new(store.clone()), hasher.clone(), None);

        use_case.create(register("alice")).await.unwrap();
        use_case
            .update(UpdateUserRequest {
                id: "alice".to_string(),
                password: "changed".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(*hasher.store_free.lock().unwrap(), vec![true, true]);
        assert_eq!(store.snapshot().await.users[0].password, "hashed:changed");
    }
}
