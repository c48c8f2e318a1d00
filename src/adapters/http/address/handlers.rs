//! HTTP handlers for address endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Response,
    Json,
};

use crate::adapters::http::error::{handle_body_rejection, handle_use_case_error, DataResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::application::models::{
    CreateAddressRequest, DeleteAddressRequest, GetAddressRequest, ListAddressRequest,
    UpdateAddressRequest,
};
use crate::application::AddressUseCase;

#[derive(Clone)]
pub struct AddressHandlers {
    use_case: Arc<AddressUseCase>,
}

impl AddressHandlers {
    pub fn new(use_case: Arc<AddressUseCase>) -> Self {
        Self { use_case }
    }
}

/// POST /api/contacts/:contact_id/addresses
pub async fn create_address(
    State(handlers): State<AddressHandlers>,
    RequireAuth(auth): RequireAuth,
    Path(contact_id): Path<String>,
    body: Result<Json<CreateAddressRequest>, JsonRejection>,
) -> Response {
    let Json(mut request) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };
    request.user_id = auth.id;
    request.contact_id = contact_id;

    match handlers.use_case.create(request).await {
        Ok(address) => DataResponse::ok(address),
        Err(e) => handle_use_case_error(e),
    }
}

/// GET /api/contacts/:contact_id/addresses
pub async fn list_addresses(
    State(handlers): State<AddressHandlers>,
    RequireAuth(auth): RequireAuth,
    Path(contact_id): Path<String>,
) -> Response {
    let request = ListAddressRequest {
        user_id: auth.id,
        contact_id,
    };

    match handlers.use_case.list(request).await {
        Ok(addresses) => DataResponse::ok(addresses),
        Err(e) => handle_use_case_error(e),
    }
}

/// GET /api/contacts/:contact_id/addresses/:address_id
pub async fn get_address(
    State(handlers): State<AddressHandlers>,
    RequireAuth(auth): RequireAuth,
    Path((contact_id, address_id)): Path<(String, String)>,
) -> Response {
    let request = GetAddressRequest {
        user_id: auth.id,
        contact_id,
        id: address_id,
    };

    match handlers.use_case.get(request).await {
        Ok(address) => DataResponse::ok(address),
        Err(e) => handle_use_case_error(e),
    }
}

/// PUT /api/contacts/:contact_id/addresses/:address_id
pub async fn update_address(
    State(handlers): State<AddressHandlers>,
    RequireAuth(auth): RequireAuth,
    Path((contact_id, address_id)): Path<(String, String)>,
    body: Result<Json<UpdateAddressRequest>, JsonRejection>,
) -> Response {
    let Json(mut request) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };
    request.user_id = auth.id;
    request.contact_id = contact_id;
    request.id = address_id;

    match handlers.use_case.update(request).await {
        Ok(address) => DataResponse::ok(address),
        Err(e) => handle_use_case_error(e),
    }
}

/// DELETE /api/contacts/:contact_id/addresses/:address_id
pub async fn delete_address(
    State(handlers): State<AddressHandlers>,
    RequireAuth(auth): RequireAuth,
    Path((contact_id, address_id)): Path<(String, String)>,
) -> Response {
    let request = DeleteAddressRequest {
        user_id: auth.id,
        contact_id,
        id: address_id,
    };

    match handlers.use_case.delete(request).await {
        Ok(done) => DataResponse::ok(done),
        Err(e) => handle_use_case_error(e),
    }
}
