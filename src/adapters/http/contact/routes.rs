//! HTTP routes for contact endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_contact, delete_contact, get_contact, search_contacts, update_contact,
    ContactHandlers,
};

pub fn contact_routes(handlers: ContactHandlers) -> Router {
    Router::new()
        .route("/contacts", post(create_contact).get(search_contacts))
        .route(
            "/contacts/:contact_id",
            get(get_contact)
                .put(update_contact)
                .delete(delete_contact),
        )
        .with_state(handlers)
}
