//! ContactUseCase - Contacts scoped to their owning user.

use std::sync::Arc;

use super::{announce, begin, commit, not_found, store_error, validate, OptionalPublisher};
use crate::application::models::{
    ContactResponse, CreateContactRequest, DeleteContactRequest, GetContactRequest,
    SearchContactRequest, UpdateContactRequest,
};
use crate::application::UseCaseError;
use crate::domain::contact::{Contact, ContactEvent};
use crate::domain::foundation::{ContactId, PageMetadata, PageRequest, UserId};
use crate::ports::{ContactFilter, UnitOfWorkFactory};

pub struct ContactUseCase {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    publisher: OptionalPublisher<ContactEvent>,
}

impl ContactUseCase {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        publisher: OptionalPublisher<ContactEvent>,
    ) -> Self {
        Self {
            uow_factory,
            publisher,
        }
    }

    pub async fn create(
        &self,
        request: CreateContactRequest,
    ) -> Result<ContactResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = owner(&request.user_id)?;

        let contact = Contact::new(user_id, request.details());

        uow.contacts()
            .create(&contact)
            .await
            .map_err(store_error("create contact"))?;

        commit(uow).await?;
        announce(&self.publisher, ContactEvent::from(&contact), "contact created").await?;

        Ok(ContactResponse::from(&contact))
    }

    pub async fn update(
        &self,
        request: UpdateContactRequest,
    ) -> Result<ContactResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = owner(&request.user_id)?;

        let mut contact = uow
            .contacts()
            .find_by_id_and_user_id(&ContactId::from_string(request.id.as_str()), &user_id)
            .await
            .map_err(store_error("find contact"))?
            .ok_or_else(not_found("contact"))?;

        contact.apply(request.details());

        uow.contacts()
            .update(&contact)
            .await
            .map_err(store_error("update contact"))?;

        commit(uow).await?;
        announce(&self.publisher, ContactEvent::from(&contact), "contact updated").await?;

        Ok(ContactResponse::from(&contact))
    }

    pub async fn get(&self, request: GetContactRequest) -> Result<ContactResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = owner(&request.user_id)?;

        let contact = uow
            .contacts()
            .find_by_id_and_user_id(&ContactId::from_string(request.id.as_str()), &user_id)
            .await
            .map_err(store_error("find contact"))?
            .ok_or_else(not_found("contact"))?;

        commit(uow).await?;

        Ok(ContactResponse::from(&contact))
    }

    /// Delete a contact and, through the store cascade, its addresses.
    pub async fn delete(&self, request: DeleteContactRequest) -> Result<bool, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = owner(&request.user_id)?;

        let contact = uow
            .contacts()
            .find_by_id_and_user_id(&ContactId::from_string(request.id.as_str()), &user_id)
            .await
            .map_err(store_error("find contact"))?
            .ok_or_else(not_found("contact"))?;

        uow.contacts()
            .delete(&contact)
            .await
            .map_err(store_error("delete contact"))?;

        commit(uow).await?;
        announce(&self.publisher, ContactEvent::from(&contact), "contact deleted").await?;

        Ok(true)
    }

    pub async fn search(
        &self,
        request: SearchContactRequest,
    ) -> Result<(Vec<ContactResponse>, PageMetadata), UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;
        let user_id = owner(&request.user_id)?;

        let page = PageRequest::new(request.page, request.size);
        let filter = ContactFilter {
            user_id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            page,
        };

        let (contacts, total) = uow
            .contacts()
            .search(&filter)
            .await
            .map_err(store_error("search contacts"))?;

        commit(uow).await?;

        let responses = contacts.iter().map(ContactResponse::from).collect();
        Ok((responses, PageMetadata::new(page, total)))
    }
}

fn owner(user_id: &str) -> Result<UserId, UseCaseError> {
    UserId::new(user_id).map_err(|e| {
        tracing::warn!(error = %e, "Failed to validate user id");
        UseCaseError::validation(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;

    fn create_request(user_id: &str, first_name: &str) -> CreateContactRequest {
        CreateContactRequest {
            user_id: user_id.to_string(),
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            phone: "0800".to_string(),
        }
    }

    #[tokio::test]
    async fn get_is_scoped_to_owner() {
        let store = InMemoryStore::new();
        let use_case = ContactUseCase::new(Arc::new(store.clone()), None);
        let created = use_case.create(create_request("u1", "Jane")).await.unwrap();

        let err = use_case
            .get(GetContactRequest {
                user_id: "u2".to_string(),
                id: created.id.clone(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_pages_results_with_ceiling_total() {
        let store = InMemoryStore::new();
        let use_case = ContactUseCase::new(Arc::new(store.clone()), None);
        for name in ["Ann", "Bob", "Cid", "Dan", "Eve"] {
            use_case.create(create_request("u1", name)).await.unwrap();
        }
        use_case.create(create_request("u2", "Zed")).await.unwrap();

        let (page, paging) = use_case
            .search(SearchContactRequest {
                user_id: "u1".to_string(),
                page: 3,
                size: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(paging.total_item, 5);
        assert_eq!(paging.total_page, 3);
    }

    #[tokio::test]
    async fn search_filters_by_name() {
        let store = InMemoryStore::new();
        let use_case = ContactUseCase::new(Arc::new(store.clone()), None);
        use_case.create(create_request("u1", "Jane")).await.unwrap();
        use_case.create(create_request("u1", "Bob")).await.unwrap();

        let (page, paging) = use_case
            .search(SearchContactRequest {
                user_id: "u1".to_string(),
                name: "jan".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(paging.total_item, 1);
        assert_eq!(page[0].first_name, "Jane");
    }

    #[tokio::test]
    async fn invalid_update_leaves_contact_unchanged() {
        let store = InMemoryStore::new();
        let use_case = ContactUseCase::new(Arc::new(store.clone()), None);
        let created = use_case.create(create_request("u1", "Jane")).await.unwrap();
        let before = store.snapshot().await;

        let err = use_case
            .update(UpdateContactRequest {
                user_id: "u1".to_string(),
                id: created.id,
                first_name: String::new(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
        assert_eq!(store.snapshot().await, before);
    }
}
