//! AddressUseCase - Addresses guarded by their owning contact.
//!
//! Every operation first loads the contact by (contact id, user id) inside
//! the same unit of work, so an address is only reachable through a contact
//! the caller owns.

use std::sync::Arc;

use super::{announce, begin, commit, not_found, store_error, validate, OptionalPublisher};
use crate::application::models::{
    AddressResponse, CreateAddressRequest, DeleteAddressRequest, GetAddressRequest,
    ListAddressRequest, UpdateAddressRequest,
};
use crate::application::UseCaseError;
use crate::domain::address::{Address, AddressEvent};
use crate::domain::contact::Contact;
use crate::domain::foundation::{AddressId, ContactId, UserId};
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

pub struct AddressUseCase {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    publisher: OptionalPublisher<AddressEvent>,
}

impl AddressUseCase {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        publisher: OptionalPublisher<AddressEvent>,
    ) -> Self {
        Self {
            uow_factory,
            publisher,
        }
    }

    pub async fn create(
        &self,
        request: CreateAddressRequest,
    ) -> Result<AddressResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;

        let contact = owned_contact(uow.as_mut(), &request.contact_id, &request.user_id).await?;
        let address = Address::new(contact.id, request.details());

        uow.addresses()
            .create(&address)
            .await
            .map_err(store_error("create address"))?;

        commit(uow).await?;
        announce(&self.publisher, AddressEvent::from(&address), "address created").await?;

        Ok(AddressResponse::from(&address))
    }

    pub async fn update(
        &self,
        request: UpdateAddressRequest,
    ) -> Result<AddressResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;

        let contact = owned_contact(uow.as_mut(), &request.contact_id, &request.user_id).await?;
        let mut address = uow
            .addresses()
            .find_by_id_and_contact_id(&AddressId::from_string(request.id.as_str()), &contact.id)
            .await
            .map_err(store_error("find address"))?
            .ok_or_else(not_found("address"))?;

        address.apply(request.details());

        uow.addresses()
            .update(&address)
            .await
            .map_err(store_error("update address"))?;

        commit(uow).await?;
        announce(&self.publisher, AddressEvent::from(&address), "address updated").await?;

        Ok(AddressResponse::from(&address))
    }

    pub async fn get(&self, request: GetAddressRequest) -> Result<AddressResponse, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;

        let contact = owned_contact(uow.as_mut(), &request.contact_id, &request.user_id).await?;
        let address = uow
            .addresses()
            .find_by_id_and_contact_id(&AddressId::from_string(request.id.as_str()), &contact.id)
            .await
            .map_err(store_error("find address"))?
            .ok_or_else(not_found("address"))?;

        commit(uow).await?;

        Ok(AddressResponse::from(&address))
    }

    pub async fn delete(&self, request: DeleteAddressRequest) -> Result<bool, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;

        let contact = owned_contact(uow.as_mut(), &request.contact_id, &request.user_id).await?;
        let address = uow
            .addresses()
            .find_by_id_and_contact_id(&AddressId::from_string(request.id.as_str()), &contact.id)
            .await
            .map_err(store_error("find address"))?
            .ok_or_else(not_found("address"))?;

        uow.addresses()
            .delete(&address)
            .await
            .map_err(store_error("delete address"))?;

        commit(uow).await?;
        announce(&self.publisher, AddressEvent::from(&address), "address deleted").await?;

        Ok(true)
    }

    pub async fn list(
        &self,
        request: ListAddressRequest,
    ) -> Result<Vec<AddressResponse>, UseCaseError> {
        let mut uow = begin(self.uow_factory.as_ref()).await?;
        validate(&request)?;

        let contact = owned_contact(uow.as_mut(), &request.contact_id, &request.user_id).await?;
        let addresses = uow
            .addresses()
            .find_all_by_contact_id(&contact.id)
            .await
            .map_err(store_error("find addresses"))?;

        commit(uow).await?;

        Ok(addresses.iter().map(AddressResponse::from).collect())
    }
}

/// Load the contact only if `user_id` owns it.
async fn owned_contact(
    uow: &mut dyn UnitOfWork,
    contact_id: &str,
    user_id: &str,
) -> Result<Contact, UseCaseError> {
    let user_id = UserId::new(user_id).map_err(|e| {
        tracing::warn!(error = %e, "Failed to validate user id");
        UseCaseError::validation(e.to_string())
    })?;

    uow.contacts()
        .find_by_id_and_user_id(&ContactId::from_string(contact_id), &user_id)
        .await
        .map_err(store_error("find contact"))?
        .ok_or_else(not_found("contact"))
}
