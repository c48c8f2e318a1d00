//! PostgreSQL unit of work.
//!
//! Wraps one `sqlx::Transaction`. Every repository call of the unit of work
//! runs inside that transaction; dropping the unit of work without `commit`
//! rolls it back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{
    AddressRepository, ContactRepository, UnitOfWork, UnitOfWorkFactory, UserRepository,
};

/// Opens a transaction per unit of work.
#[derive(Clone)]
pub struct PgUnitOfWorkFactory {
    pool: PgPool,
}

impl std::fmt::Debug for PgUnitOfWorkFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUnitOfWorkFactory")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PgUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PgUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// An open PostgreSQL transaction.
pub struct PgUnitOfWork {
    pub(super) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn users(&mut self) -> &mut dyn UserRepository {
        self
    }

    fn contacts(&mut self) -> &mut dyn ContactRepository {
        self
    }

    fn addresses(&mut self) -> &mut dyn AddressRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DomainError::database(format!("Failed to roll back transaction: {}", e)))
    }
}

/// Maps a write failure, turning unique violations into `conflict`.
pub(super) fn write_error(action: &str, conflict: ErrorCode, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DomainError::new(conflict, format!("Failed to {}: {}", action, db_err))
        }
        e => DomainError::database(format!("Failed to {}: {}", action, e)),
    }
}

/// Maps a read failure.
pub(super) fn read_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}
