//! HTTP adapter for user endpoints.
//!
//! - `POST /api/users` - Register
//! - `POST /api/users/_login` - Log in and receive a session token
//! - `GET /api/users/_current` - Current user
//! - `PATCH /api/users/_current` - Update name and/or password
//! - `DELETE /api/users` - Log out

pub mod handlers;
pub mod routes;

pub use handlers::UserHandlers;
pub use routes::user_routes;
