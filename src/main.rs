//! API server: REST endpoints over PostgreSQL with post-commit announcements.

use std::sync::Arc;

use contact_hub::adapters::events::{
    AddressProducer, ContactProducer, RedisStreamsProducer, UserProducer,
};
use contact_hub::adapters::http::{api_router, ApiServices};
use contact_hub::adapters::postgres::{PgUnitOfWorkFactory, MIGRATOR};
use contact_hub::adapters::security::BcryptPasswordHasher;
use contact_hub::application::{AddressUseCase, ContactUseCase, OptionalPublisher, UserUseCase};
use contact_hub::config::AppConfig;
use contact_hub::domain::address::AddressEvent;
use contact_hub::domain::contact::ContactEvent;
use contact_hub::domain::user::UserEvent;
use contact_hub::ports::{LogProducer, UnitOfWorkFactory};
use contact_hub::startup::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    tracing::info!(environment = ?config.server.environment, "Starting contact-hub");

    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        MIGRATOR.run(&pool).await?;
    }
    let uow_factory: Arc<dyn UnitOfWorkFactory> = Arc::new(PgUnitOfWorkFactory::new(pool.clone()));

    let (users, contacts, addresses): (
        OptionalPublisher<UserEvent>,
        OptionalPublisher<ContactEvent>,
        OptionalPublisher<AddressEvent>,
    ) = if config.event_log.producer_enabled {
        let log: Arc<dyn LogProducer> =
            Arc::new(RedisStreamsProducer::connect(&config.event_log).await?);
        tracing::info!(url = %config.event_log.url, "Event producer connected");
        (
            Some(Arc::new(UserProducer::new(log.clone()))),
            Some(Arc::new(ContactProducer::new(log.clone()))),
            Some(Arc::new(AddressProducer::new(log))),
        )
    } else {
        tracing::info!("Event producer disabled");
        (None, None, None)
    };

    let hasher = Arc::new(BcryptPasswordHasher::new(config.security.bcrypt_cost));
    let services = ApiServices {
        users: Arc::new(UserUseCase::new(uow_factory.clone(), hasher, users)),
        contacts: Arc::new(ContactUseCase::new(uow_factory.clone(), contacts)),
        addresses: Arc::new(AddressUseCase::new(uow_factory, addresses)),
    };
    let app = api_router(services, config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing database pool");
    pool.close().await;
    Ok(())
}
