//! PostgreSQL adapters - Transactional persistence for the repository ports.
//!
//! - `PgUnitOfWorkFactory` - Opens one transaction per unit of work
//! - `PgUnitOfWork` - Implements the user, contact and address repositories
//!   on that transaction

mod address_repository;
mod contact_repository;
mod unit_of_work;
mod user_repository;

pub use unit_of_work::{PgUnitOfWork, PgUnitOfWorkFactory};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
