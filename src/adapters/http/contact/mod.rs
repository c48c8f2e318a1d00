//! HTTP adapter for contact endpoints.
//!
//! - `POST /api/contacts` - Create
//! - `GET /api/contacts` - Search (`name`, `email`, `phone`, `page`, `size`)
//! - `GET /api/contacts/:contact_id` - Get
//! - `PUT /api/contacts/:contact_id` - Replace editable fields
//! - `DELETE /api/contacts/:contact_id` - Delete with its addresses

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::ContactPageResponse;
pub use handlers::ContactHandlers;
pub use routes::contact_routes;
