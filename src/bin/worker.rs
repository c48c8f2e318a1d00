//! Consumer worker: one group consumer loop per destination stream.

use std::sync::Arc;

use tokio::sync::watch;

use contact_hub::adapters::events::{
    consume_topic, handler_for_topic, ConsumerLoopConfig, RedisConsumerGroup,
};
use contact_hub::config::AppConfig;
use contact_hub::domain::foundation::topics;
use contact_hub::ports::ConsumerGroup;
use contact_hub::startup::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.server.validate()?;
    config.event_log.validate()?;
    init_tracing(&config.server);

    tracing::info!(
        group_id = %config.event_log.group_id,
        consumer = %config.event_log.consumer_name,
        "Starting contact-hub worker"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_config = ConsumerLoopConfig::default().with_retry_backoff(config.event_log.retry_backoff());

    let mut loops = Vec::with_capacity(topics::ALL.len());
    for topic in topics::ALL {
        let handler = handler_for_topic(topic)
            .ok_or_else(|| format!("No handler registered for stream {}", topic))?;
        let group: Arc<dyn ConsumerGroup> =
            Arc::new(RedisConsumerGroup::connect(&config.event_log).await?);
        loops.push(tokio::spawn(consume_topic(
            group,
            topic,
            handler,
            shutdown_rx.clone(),
            loop_config.clone(),
        )));
    }
    drop(shutdown_rx);

    shutdown_signal().await;
    tracing::info!("Stopping consumer loops");
    if shutdown_tx.send(true).is_err() {
        tracing::debug!("All consumer loops already stopped");
    }

    for result in futures::future::join_all(loops).await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Consumer loop task failed");
        }
    }

    tracing::info!("Worker stopped");
    Ok(())
}
