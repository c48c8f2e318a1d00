//! Event log ports - Partitioned append-only transport.
//!
//! The log is a set of named destination streams, each split into
//! partitions. Producers append keyed messages and learn where they landed;
//! consumers join a named group, receive a session-scoped claim and
//! acknowledge messages one by one.
//!
//! ## Producer side
//!
//! - `LogProducer` - synchronous, unbuffered `send_message(topic, key, value)`
//!
//! ## Consumer side
//!
//! - `ConsumerGroup` - opens sessions, exposes the asynchronous error channel
//! - `GroupSession` - pulls batches for the current claim and marks offsets
//! - `MessageHandler` - per-stream processing invoked once per message

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("event log unavailable: {0}")]
    Unavailable(String),

    #[error("event log operation timed out after {0}ms")]
    Timeout(u64),

    #[error("consumer group is closed")]
    Closed,

    #[error("event log protocol error: {0}")]
    Protocol(String),
}

/// Where an appended message landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPosition {
    pub partition: i32,
    pub offset: i64,
}

/// Synchronous send-to-log client.
///
/// Implementations are shared process-wide and must be safe for concurrent
/// use. A call blocks until the log accepts the message or the attempt fails;
/// there is no internal buffering or batching.
#[async_trait]
pub trait LogProducer: Send + Sync {
    /// Append one message. The partition is chosen from `key`.
    ///
    /// # Errors
    ///
    /// - `TransportError` if the append did not complete; the message may
    ///   still have landed
    async fn send_message(
        &self,
        topic: &str,
        key: &str,
        value: &[u8],
    ) -> Result<RecordPosition, TransportError>;
}

/// A message delivered to a consumer group member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub value: Vec<u8>,
}

/// One claim on a set of partitions.
///
/// A session ends when the group rebalances or the transport drops it;
/// `next_batch` then yields `None` and the caller must open a new session.
#[async_trait]
pub trait GroupSession: Send {
    /// Wait for the next batch of messages in partition order.
    ///
    /// Returns `Ok(None)` once the claim has ended.
    async fn next_batch(&mut self) -> Result<Option<Vec<ConsumerMessage>>, TransportError>;

    /// Acknowledge a message so the group's committed offset may advance
    /// past it.
    async fn mark_message(&mut self, message: &ConsumerMessage) -> Result<(), TransportError>;
}

/// A named cursor set shared by cooperating readers.
#[async_trait]
pub trait ConsumerGroup: Send + Sync {
    /// Join the group and wait for a claim on `topics`.
    async fn consume(&self, topics: &[String]) -> Result<Box<dyn GroupSession>, TransportError>;

    /// Take the asynchronous error channel. Yields `Some` only once.
    ///
    /// The channel closes when the group is closed.
    fn take_errors(&self) -> Option<mpsc::UnboundedReceiver<TransportError>>;

    /// Leave the group. Open sessions end and later `consume` calls fail with
    /// `TransportError::Closed`.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Per-message processing failure.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(String),
}

/// Processing function invoked by the consumer loop once per message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn consume(&self, message: &ConsumerMessage) -> Result<(), HandlerError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_traits_are_object_safe() {
        fn _producer(_p: &dyn LogProducer) {}
        fn _group(_g: &dyn ConsumerGroup) {}
        fn _session(_s: Box<dyn GroupSession>) {}
        fn _handler(_h: &dyn MessageHandler) {}
    }

    #[test]
    fn transport_error_messages_are_descriptive() {
        assert_eq!(
            TransportError::Timeout(1500).to_string(),
            "event log operation timed out after 1500ms"
        );
        assert_eq!(TransportError::Closed.to_string(), "consumer group is closed");
    }
}
