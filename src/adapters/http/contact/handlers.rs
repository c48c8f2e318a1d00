//! HTTP handlers for contact endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{
    handle_body_rejection, handle_query_rejection, handle_use_case_error, DataResponse,
};
use crate::adapters::http::middleware::RequireAuth;
use crate::application::models::{
    CreateContactRequest, DeleteContactRequest, GetContactRequest, SearchContactRequest,
    UpdateContactRequest,
};
use crate::application::ContactUseCase;

use super::dto::ContactPageResponse;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ContactHandlers {
    use_case: Arc<ContactUseCase>,
}

impl ContactHandlers {
    pub fn new(use_case: Arc<ContactUseCase>) -> Self {
        Self { use_case }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/contacts
pub async fn create_contact(
    State(handlers): State<ContactHandlers>,
    RequireAuth(auth): RequireAuth,
    body: Result<Json<CreateContactRequest>, JsonRejection>,
) -> Response {
    let Json(mut request) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };
    request.user_id = auth.id;

    match handlers.use_case.create(request).await {
        Ok(contact) => DataResponse::ok(contact),
        Err(e) => handle_use_case_error(e),
    }
}

/// GET /api/contacts
pub async fn search_contacts(
    State(handlers): State<ContactHandlers>,
    RequireAuth(auth): RequireAuth,
    query: Result<Query<SearchContactRequest>, QueryRejection>,
) -> Response {
    let Query(mut request) = match query {
        Ok(query) => query,
        Err(rejection) => return handle_query_rejection(rejection),
    };
    request.user_id = auth.id;

    match handlers.use_case.search(request).await {
        Ok((data, paging)) => {
            (StatusCode::OK, Json(ContactPageResponse { data, paging })).into_response()
        }
        Err(e) => handle_use_case_error(e),
    }
}

/// GET /api/contacts/:contact_id
pub async fn get_contact(
    State(handlers): State<ContactHandlers>,
    RequireAuth(auth): RequireAuth,
    Path(contact_id): Path<String>,
) -> Response {
    let request = GetContactRequest {
        user_id: auth.id,
        id: contact_id,
    };

    match handlers.use_case.get(request).await {
        Ok(contact) => DataResponse::ok(contact),
        Err(e) => handle_use_case_error(e),
    }
}

/// PUT /api/contacts/:contact_id
pub async fn update_contact(
    State(handlers): State<ContactHandlers>,
    RequireAuth(auth): RequireAuth,
    Path(contact_id): Path<String>,
    body: Result<Json<UpdateContactRequest>, JsonRejection>,
) -> Response {
    let Json(mut request) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };
    request.user_id = auth.id;
    request.id = contact_id;

    match handlers.use_case.update(request).await {
        Ok(contact) => DataResponse::ok(contact),
        Err(e) => handle_use_case_error(e),
    }
}

/// DELETE /api/contacts/:contact_id
pub async fn delete_contact(
    State(handlers): State<ContactHandlers>,
    RequireAuth(auth): RequireAuth,
    Path(contact_id): Path<String>,
) -> Response {
    let request = DeleteContactRequest {
        user_id: auth.id,
        id: contact_id,
    };

    match handlers.use_case.delete(request).await {
        Ok(done) => DataResponse::ok(done),
        Err(e) => handle_use_case_error(e),
    }
}
