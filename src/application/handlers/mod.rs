//! Application handlers.
//!
//! One use case per entity kind. Every operation owns exactly one unit of
//! work: it begins it, validates the request, performs guarded reads and
//! writes, commits, and only then announces the committed state through the
//! optional publisher. Any early return drops the unit of work, which rolls
//! it back.

mod address;
mod contact;
mod user;

pub use address::AddressUseCase;
pub use contact::ContactUseCase;
pub use user::UserUseCase;

use std::sync::Arc;

use validator::Validate;

use crate::application::UseCaseError;
use crate::domain::foundation::{DomainError, DomainEvent};
use crate::ports::{EventPublisher, UnitOfWork, UnitOfWorkFactory};

/// Publisher slot of a use case; `None` when the event log is disabled.
pub type OptionalPublisher<E> = Option<Arc<dyn EventPublisher<E>>>;

async fn begin(factory: &dyn UnitOfWorkFactory) -> Result<Box<dyn UnitOfWork>, UseCaseError> {
    factory.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        UseCaseError::persistence("failed to begin transaction")
    })
}

async fn commit(uow: Box<dyn UnitOfWork>) -> Result<(), UseCaseError> {
    uow.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit transaction");
        UseCaseError::persistence("failed to commit transaction")
    })
}

fn validate(request: &impl Validate) -> Result<(), UseCaseError> {
    request.validate().map_err(|e| {
        tracing::warn!(error = %e, "Failed to validate request");
        UseCaseError::from(e)
    })
}

/// Maps a store failure to `Persistence`, logging what was attempted.
fn store_error(action: &'static str) -> impl FnOnce(DomainError) -> UseCaseError {
    move |e| {
        tracing::error!(error = %e, "Failed to {}", action);
        UseCaseError::persistence(format!("failed to {}", action))
    }
}

fn not_found(resource: &'static str) -> impl FnOnce() -> UseCaseError {
    move || {
        tracing::warn!("Failed to find {}", resource);
        UseCaseError::not_found(resource)
    }
}

/// Announces a committed mutation. Exactly one send attempt when a publisher
/// is configured, a silent no-op otherwise.
async fn announce<E: DomainEvent>(
    publisher: &OptionalPublisher<E>,
    event: E,
    action: &str,
) -> Result<(), UseCaseError> {
    let Some(publisher) = publisher else {
        tracing::info!(topic = E::TOPIC, "Event producer is disabled, skipping {} event", action);
        return Ok(());
    };

    if let Err(e) = publisher.send(&event).await {
        tracing::error!(error = %e, topic = E::TOPIC, id = event.id(), "Failed to publish {} event", action);
        return Err(e.into());
    }

    tracing::info!(topic = E::TOPIC, id = event.id(), "Published {} event", action);
    Ok(())
}
