//! Application layer - Use cases, request models and their errors.
//!
//! This layer orchestrates domain operations and coordinates between ports.

mod errors;
pub mod handlers;
pub mod models;

pub use errors::UseCaseError;
pub use handlers::{AddressUseCase, ContactUseCase, OptionalPublisher, UserUseCase};
