//! HTTP adapter for address endpoints, nested under a contact.
//!
//! - `POST /api/contacts/:contact_id/addresses` - Create
//! - `GET /api/contacts/:contact_id/addresses` - List
//! - `GET|PUT|DELETE /api/contacts/:contact_id/addresses/:address_id`

pub mod handlers;
pub mod routes;

pub use handlers::AddressHandlers;
pub use routes::address_routes;
