//! Unit of work port - Scoped transaction over the relational store.
//!
//! A use case opens exactly one unit of work per call through
//! [`UnitOfWorkFactory::begin`], reads and writes through the repositories it
//! exposes, and converts the default outcome (rollback) into a commit by
//! calling [`UnitOfWork::commit`] on the success path only.
//!
//! # Design
//!
//! - **Rollback by default**: dropping a unit of work without committing
//!   discards every write made through it
//! - **Consumed on completion**: `commit` and `rollback` take `self: Box<Self>`
//!   so a finished unit of work cannot be reused
//! - **Repositories are borrowed**: each repository is a view over the same
//!   transaction, not an independent connection

use async_trait::async_trait;

use crate::domain::address::Address;
use crate::domain::contact::Contact;
use crate::domain::foundation::{AddressId, ContactId, DomainError, PageRequest, UserId};
use crate::domain::user::User;

/// A persisted record with a stable identifier.
pub trait Entity: Send + Sync + 'static {
    type Id: Send + Sync;

    fn entity_id(&self) -> &Self::Id;
}

impl Entity for User {
    type Id = UserId;

    fn entity_id(&self) -> &UserId {
        &self.id
    }
}

impl Entity for Contact {
    type Id = ContactId;

    fn entity_id(&self) -> &ContactId {
        &self.id
    }
}

impl Entity for Address {
    type Id = AddressId;

    fn entity_id(&self) -> &AddressId {
        &self.id
    }
}

/// Keyed CRUD shared by every entity kind.
#[async_trait]
pub trait Repository<T: Entity>: Send {
    /// Insert a new row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (including a duplicate key)
    async fn create(&mut self, entity: &T) -> Result<(), DomainError>;

    /// Overwrite the row with the same id.
    async fn update(&mut self, entity: &T) -> Result<(), DomainError>;

    /// Remove the row with the same id.
    async fn delete(&mut self, entity: &T) -> Result<(), DomainError>;

    /// Number of rows with this id (0 or 1).
    async fn count_by_id(&mut self, id: &T::Id) -> Result<i64, DomainError>;

    /// Returns `None` if not found.
    async fn find_by_id(&mut self, id: &T::Id) -> Result<Option<T>, DomainError>;
}

#[async_trait]
pub trait UserRepository: Repository<User> {
    /// Resolve a session token to the user holding it.
    async fn find_by_token(&mut self, token: &str) -> Result<Option<User>, DomainError>;
}

/// Predicates for a contact search.
///
/// `name`, `email` and `phone` are case-insensitive substring filters, each
/// applied only when non-empty. The owner predicate always applies.
#[derive(Debug, Clone)]
pub struct ContactFilter {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub page: PageRequest,
}

impl ContactFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            page: PageRequest::default(),
        }
    }

    /// True when `contact` satisfies every active predicate.
    pub fn matches(&self, contact: &Contact) -> bool {
        fn contains_ci(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        if contact.user_id != self.user_id {
            return false;
        }
        if !self.name.is_empty()
            && !contains_ci(&contact.first_name, &self.name)
            && !contains_ci(&contact.last_name, &self.name)
        {
            return false;
        }
        if !self.email.is_empty() && !contains_ci(&contact.email, &self.email) {
            return false;
        }
        if !self.phone.is_empty() && !contains_ci(&contact.phone, &self.phone) {
            return false;
        }
        true
    }
}

#[async_trait]
pub trait ContactRepository: Repository<Contact> {
    /// Load a contact only if it belongs to `user_id`.
    async fn find_by_id_and_user_id(
        &mut self,
        id: &ContactId,
        user_id: &UserId,
    ) -> Result<Option<Contact>, DomainError>;

    /// One page of matching contacts plus the total match count.
    async fn search(&mut self, filter: &ContactFilter) -> Result<(Vec<Contact>, i64), DomainError>;
}

#[async_trait]
pub trait AddressRepository: Repository<Address> {
    /// Load an address only if it is attached to `contact_id`.
    async fn find_by_id_and_contact_id(
        &mut self,
        id: &AddressId,
        contact_id: &ContactId,
    ) -> Result<Option<Address>, DomainError>;

    async fn find_all_by_contact_id(
        &mut self,
        contact_id: &ContactId,
    ) -> Result<Vec<Address>, DomainError>;
}

/// An open transaction.
#[async_trait]
pub trait UnitOfWork: Send {
    fn users(&mut self) -> &mut dyn UserRepository;

    fn contacts(&mut self) -> &mut dyn ContactRepository;

    fn addresses(&mut self) -> &mut dyn AddressRepository;

    /// Make every write durable.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if the store rejects the commit; nothing is persisted
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discard every write. Equivalent to dropping the unit of work.
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Opens units of work against a shared connection pool.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError>;
}
