//! HTTP adapters - REST API over the use cases.
//!
//! Each resource has its own module with handlers and routes; `router`
//! assembles them behind the auth middleware.

pub mod address;
pub mod contact;
pub mod error;
pub mod middleware;
pub mod router;
pub mod user;

pub use error::{DataResponse, ErrorResponse};
pub use router::{api_router, ApiServices};
