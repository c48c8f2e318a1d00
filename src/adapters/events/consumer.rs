//! Consumer loop - Continuous group consumption of one destination stream.
//!
//! The loop re-issues `consume` every time a session ends (rebalance,
//! transport error) and stops only when the shutdown signal is raised.
//! Within a session each message is handed to the handler in order and is
//! marked only when the handler succeeds; a failed message is logged and
//! skipped without advancing the offset.
//!
//! ## Graceful Shutdown
//!
//! Shutdown is observed between batches and while waiting for one. A batch
//! already pulled is finished, so a running handler is never preempted.
//! On exit the group handle is closed and the error-draining task joined.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::ports::{ConsumerGroup, GroupSession, MessageHandler, TransportError};

/// Configuration for a consumer loop.
#[derive(Debug, Clone)]
pub struct ConsumerLoopConfig {
    /// Pause before re-subscribing after a failed `consume` or session.
    pub retry_backoff: Duration,
}

impl Default for ConsumerLoopConfig {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_secs(2),
        }
    }
}

impl ConsumerLoopConfig {
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

enum SessionOutcome {
    /// The claim ended; subscribe again.
    Ended,
    /// Shutdown was requested.
    Shutdown,
}

/// Run the loop for `topic` until `shutdown` flips to `true` (or its sender
/// is dropped).
pub async fn consume_topic(
    group: Arc<dyn ConsumerGroup>,
    topic: impl Into<String>,
    handler: Arc<dyn MessageHandler>,
    mut shutdown: watch::Receiver<bool>,
    config: ConsumerLoopConfig,
) {
    let topic = topic.into();
    let topics = vec![topic.clone()];

    let error_drain = group.take_errors().map(|mut errors| {
        let topic = topic.clone();
        tokio::spawn(async move {
            while let Some(e) = errors.recv().await {
                tracing::error!(error = %e, topic = %topic, "Consumer group error");
            }
        })
    });

    tracing::info!(topic = %topic, handler = handler.name(), "Starting consumer loop");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let subscribed = tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            session = group.consume(&topics) => session,
        };

        let failure = match subscribed {
            Ok(session) => {
                match run_session(session, handler.as_ref(), &mut shutdown).await {
                    Ok(SessionOutcome::Shutdown) => break,
                    Ok(SessionOutcome::Ended) => {
                        tracing::info!(topic = %topic, "Consumer session ended, resubscribing");
                        None
                    }
                    Err(e) => Some(e),
                }
            }
            Err(e) => Some(e),
        };

        if let Some(e) = failure {
            tracing::error!(error = %e, topic = %topic, "Error from consumer");
            if wait_backoff(&mut shutdown, config.retry_backoff).await {
                break;
            }
        }
    }

    tracing::info!(topic = %topic, "Closing consumer group");
    if let Err(e) = group.close().await {
        tracing::error!(error = %e, topic = %topic, "Failed to close consumer group");
    }
    if let Some(task) = error_drain {
        if let Err(e) = task.await {
            tracing::error!(error = %e, topic = %topic, "Consumer error drain task failed");
        }
    }
}

/// Process one claim until it ends, fails or shutdown is requested.
async fn run_session(
    mut session: Box<dyn GroupSession>,
    handler: &dyn MessageHandler,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<SessionOutcome, TransportError> {
    loop {
        if *shutdown.borrow() {
            return Ok(SessionOutcome::Shutdown);
        }

        let batch = tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() {
                    return Ok(SessionOutcome::Shutdown);
                }
                continue;
            }
            batch = session.next_batch() => batch?,
        };

        let Some(messages) = batch else {
            return Ok(SessionOutcome::Ended);
        };

        for message in &messages {
            match handler.consume(message).await {
                Ok(()) => session.mark_message(message).await?,
                Err(e) => tracing::error!(
                    error = %e,
                    handler = handler.name(),
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    "Failed to process message"
                ),
            }
        }
    }
}

/// Sleep for `backoff` unless shutdown arrives first. Returns `true` on shutdown.
async fn wait_backoff(shutdown: &mut watch::Receiver<bool>, backoff: Duration) -> bool {
    tokio::select! {
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
        _ = tokio::time::sleep(backoff) => false,
    }
}
