//! In-memory unit of work.
//!
//! A unit of work holds the store lock for its whole life and writes to a
//! staged copy of the tables. Commit swaps the copy in; dropping the unit of
//! work (or rolling it back) discards it. Transactions are therefore fully
//! serialized.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::address::Address;
use crate::domain::contact::Contact;
use crate::domain::foundation::{AddressId, ContactId, DomainError, UserId};
use crate::domain::user::User;
use crate::ports::{
    AddressRepository, ContactFilter, ContactRepository, Entity, Repository, UnitOfWork,
    UnitOfWorkFactory, UserRepository,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    contacts: BTreeMap<ContactId, Contact>,
    addresses: BTreeMap<AddressId, Address>,
}

/// Copy of every row, ordered by id, for before/after comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub users: Vec<User>,
    pub contacts: Vec<Contact>,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_next_commit: AtomicBool,
    fail_writes: AtomicBool,
    commits: AtomicUsize,
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Current committed state.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let tables = self.tables.lock().await;
        StoreSnapshot {
            users: tables.users.values().cloned().collect(),
            contacts: tables.contacts.values().cloned().collect(),
            addresses: tables.addresses.values().cloned().collect(),
        }
    }

    /// Makes the next commit fail; nothing from that unit of work persists.
    pub fn fail_next_commit(&self) {
        self.faults.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Makes every insert, update and delete fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.faults.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> usize {
        self.faults.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let committed = self.tables.clone().lock_owned().await;
        let staged = committed.clone();
        Ok(Box::new(InMemoryUnitOfWork {
            committed,
            staged,
            faults: self.faults.clone(),
        }))
    }
}

/// Open in-memory transaction.
pub struct InMemoryUnitOfWork {
    committed: OwnedMutexGuard<Tables>,
    staged: Tables,
    faults: Arc<Faults>,
}

impl InMemoryUnitOfWork {
    fn check_writable(&self) -> Result<(), DomainError> {
        if self.faults.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated write failure"));
        }
        Ok(())
    }
}

/// Entities stored in one of the staged tables.
trait Table: Entity + Clone
where
    Self::Id: Ord + Clone,
{
    fn table(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;

    /// Rows removed together with `entity`.
    fn cascade(_tables: &mut Tables, _entity: &Self) {}
}

impl Table for User {
    fn table(tables: &mut Tables) -> &mut BTreeMap<UserId, User> {
        &mut tables.users
    }
}

impl Table for Contact {
    fn table(tables: &mut Tables) -> &mut BTreeMap<ContactId, Contact> {
        &mut tables.contacts
    }

    fn cascade(tables: &mut Tables, contact: &Contact) {
        tables
            .addresses
            .retain(|_, address| address.contact_id != contact.id);
    }
}

impl Table for Address {
    fn table(tables: &mut Tables) -> &mut BTreeMap<AddressId, Address> {
        &mut tables.addresses
    }
}

#[async_trait]
impl<T> Repository<T> for InMemoryUnitOfWork
where
    T: Table,
    T::Id: Ord + Clone,
{
    async fn create(&mut self, entity: &T) -> Result<(), DomainError> {
        self.check_writable()?;
        let table = T::table(&mut self.staged);
        if table.contains_key(entity.entity_id()) {
            return Err(DomainError::database("duplicate key value violates unique constraint"));
        }
        table.insert(entity.entity_id().clone(), entity.clone());
        Ok(())
    }

    async fn update(&mut self, entity: &T) -> Result<(), DomainError> {
        self.check_writable()?;
        if let Some(row) = T::table(&mut self.staged).get_mut(entity.entity_id()) {
            *row = entity.clone();
        }
        Ok(())
    }

    async fn delete(&mut self, entity: &T) -> Result<(), DomainError> {
        self.check_writable()?;
        T::table(&mut self.staged).remove(entity.entity_id());
        T::cascade(&mut self.staged, entity);
        Ok(())
    }

    async fn count_by_id(&mut self, id: &T::Id) -> Result<i64, DomainError> {
        Ok(i64::from(T::table(&mut self.staged).contains_key(id)))
    }

    async fn find_by_id(&mut self, id: &T::Id) -> Result<Option<T>, DomainError> {
        Ok(T::table(&mut self.staged).get(id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUnitOfWork {
    async fn find_by_token(&mut self, token: &str) -> Result<Option<User>, DomainError> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self
            .staged
            .users
            .values()
            .find(|user| user.token == token)
            .cloned())
    }
}

#[async_trait]
impl ContactRepository for InMemoryUnitOfWork {
    async fn find_by_id_and_user_id(
        &mut self,
        id: &ContactId,
        user_id: &UserId,
    ) -> Result<Option<Contact>, DomainError> {
        Ok(self
            .staged
            .contacts
            .get(id)
            .filter(|contact| contact.is_owned_by(user_id))
            .cloned())
    }

    async fn search(&mut self, filter: &ContactFilter) -> Result<(Vec<Contact>, i64), DomainError> {
        let mut matching: Vec<&Contact> = self
            .staged
            .contacts
            .values()
            .filter(|contact| filter.matches(contact))
            .collect();
        matching.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit() as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }
}

#[async_trait]
impl AddressRepository for InMemoryUnitOfWork {
    async fn find_by_id_and_contact_id(
        &mut self,
        id: &AddressId,
        contact_id: &ContactId,
    ) -> Result<Option<Address>, DomainError> {
        Ok(self
            .staged
            .addresses
            .get(id)
            .filter(|address| &address.contact_id == contact_id)
            .cloned())
    }

    async fn find_all_by_contact_id(
        &mut self,
        contact_id: &ContactId,
    ) -> Result<Vec<Address>, DomainError> {
        Ok(self
            .staged
            .addresses
            .values()
            .filter(|address| &address.contact_id == contact_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn users(&mut self) -> &mut dyn UserRepository {
        self
    }

    fn contacts(&mut self) -> &mut dyn ContactRepository {
        self
    }

    fn addresses(&mut self) -> &mut dyn AddressRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryUnitOfWork {
            mut committed,
            staged,
            faults,
        } = *self;

        if faults.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(DomainError::database("simulated commit failure"));
        }

        *committed = staged;
        faults.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::ContactDetails;
    use crate::domain::address::AddressDetails;

    fn user(id: &str) -> User {
        User::register(UserId::new(id).unwrap(), "Name", "hash")
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_next_unit_of_work() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.users().create(&user("alice")).await.unwrap();
        uow.commit().await.unwrap();

        let mut next = store.begin().await.unwrap();
        let found = next
            .users()
            .find_by_id(&UserId::new("alice").unwrap())
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let store = InMemoryStore::new();

        {
            let mut uow = store.begin().await.unwrap();
            uow.users().create(&user("alice")).await.unwrap();
        }

        assert!(store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn failed_commit_persists_nothing() {
        let store = InMemoryStore::new();
        store.fail_next_commit();

        let mut uow = store.begin().await.unwrap();
        uow.users().create(&user("alice")).await.unwrap();

        assert!(uow.commit().await.is_err());
        assert!(store.snapshot().await.users.is_empty());
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.users().create(&user("alice")).await.unwrap();

        assert!(uow.users().create(&user("alice")).await.is_err());
    }

    #[tokio::test]
    async fn deleting_contact_removes_its_addresses() {
        let store = InMemoryStore::new();
        let contact = Contact::new(UserId::new("alice").unwrap(), ContactDetails::default());
        let address = Address::new(contact.id.clone(), AddressDetails::default());

        let mut uow = store.begin().await.unwrap();
        uow.contacts().create(&contact).await.unwrap();
        uow.addresses().create(&address).await.unwrap();
        uow.contacts().delete(&contact).await.unwrap();
        uow.commit().await.unwrap();

        let snapshot = store.snapshot().await;
        assert!(snapshot.contacts.is_empty());
        assert!(snapshot.addresses.is_empty());
    }

    #[tokio::test]
    async fn find_by_token_ignores_empty_token() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.users().create(&user("alice")).await.unwrap();

        assert!(uow.users().find_by_token("").await.unwrap().is_none());
    }
}
