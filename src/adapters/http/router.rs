//! Top-level API router.

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::address::{address_routes, AddressHandlers};
use super::contact::{contact_routes, ContactHandlers};
use super::middleware::auth_middleware;
use super::user::{user_routes, UserHandlers};
use crate::application::{AddressUseCase, ContactUseCase, UserUseCase};

/// Use cases served by the API.
#[derive(Clone)]
pub struct ApiServices {
    pub users: Arc<UserUseCase>,
    pub contacts: Arc<ContactUseCase>,
    pub addresses: Arc<AddressUseCase>,
}

/// Mount every endpoint under `/api` behind the session-token middleware.
pub fn api_router(services: ApiServices, request_timeout: Duration) -> Router {
    let api = Router::new()
        .merge(user_routes(UserHandlers::new(services.users.clone())))
        .merge(contact_routes(ContactHandlers::new(services.contacts)))
        .merge(address_routes(AddressHandlers::new(services.addresses)))
        .layer(middleware::from_fn_with_state(services.users, auth_middleware));

    Router::new()
        .nest("/api", api)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
