//! HTTP routes for address endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_address, delete_address, get_address, list_addresses, update_address,
    AddressHandlers,
};

pub fn address_routes(handlers: AddressHandlers) -> Router {
    Router::new()
        .route(
            "/contacts/:contact_id/addresses",
            post(create_address).get(list_addresses),
        )
        .route(
            "/contacts/:contact_id/addresses/:address_id",
            get(get_address).put(update_address).delete(delete_address),
        )
        .with_state(handlers)
}
