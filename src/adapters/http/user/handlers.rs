//! HTTP handlers for user endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};

use crate::adapters::http::error::{handle_body_rejection, handle_use_case_error, DataResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::application::models::{
    GetUserRequest, LoginUserRequest, LogoutUserRequest, RegisterUserRequest, UpdateUserRequest,
};
use crate::application::UserUseCase;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct UserHandlers {
    use_case: Arc<UserUseCase>,
}

impl UserHandlers {
    pub fn new(use_case: Arc<UserUseCase>) -> Self {
        Self { use_case }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/users
pub async fn register(
    State(handlers): State<UserHandlers>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };

    match handlers.use_case.create(request).await {
        Ok(user) => DataResponse::ok(user),
        Err(e) => handle_use_case_error(e),
    }
}

/// POST /api/users/_login
pub async fn login(
    State(handlers): State<UserHandlers>,
    body: Result<Json<LoginUserRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };

    match handlers.use_case.login(request).await {
        Ok(user) => DataResponse::ok(user),
        Err(e) => handle_use_case_error(e),
    }
}

/// GET /api/users/_current
pub async fn current(
    State(handlers): State<UserHandlers>,
    RequireAuth(auth): RequireAuth,
) -> Response {
    match handlers.use_case.current(GetUserRequest { id: auth.id }).await {
        Ok(user) => DataResponse::ok(user),
        Err(e) => handle_use_case_error(e),
    }
}

/// PATCH /api/users/_current
pub async fn update(
    State(handlers): State<UserHandlers>,
    RequireAuth(auth): RequireAuth,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Response {
    let Json(mut request) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };
    request.id = auth.id;

    match handlers.use_case.update(request).await {
        Ok(user) => DataResponse::ok(user),
        Err(e) => handle_use_case_error(e),
    }
}

/// DELETE /api/users
pub async fn logout(
    State(handlers): State<UserHandlers>,
    RequireAuth(auth): RequireAuth,
) -> Response {
    match handlers.use_case.logout(LogoutUserRequest { id: auth.id }).await {
        Ok(done) => DataResponse::ok(done),
        Err(e) => handle_use_case_error(e),
    }
}
