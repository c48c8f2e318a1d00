//! Integration tests for the worker's consumer loop.
//!
//! Events produced by the use cases flow through the in-memory log into the
//! stream handlers the worker runs. Covers acknowledgment, redelivery of
//! unacknowledged messages and cooperative shutdown.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use contact_hub::adapters::events::{
    consume_topic, ConsumerLoopConfig, ContactConsumer, ContactProducer, InMemoryEventLog,
    UserConsumer,
};
use contact_hub::adapters::memory::InMemoryStore;
use contact_hub::application::models::CreateContactRequest;
use contact_hub::application::ContactUseCase;
use contact_hub::ports::{ConsumerMessage, HandlerError, LogProducer, MessageHandler};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Wraps a handler and records every offset it was handed.
struct Recording {
    inner: Arc<dyn MessageHandler>,
    seen: Mutex<Vec<(i32, i64)>>,
}

impl Recording {
    fn new(inner: Arc<dyn MessageHandler>) -> Self {
        Self {
            inner,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<(i32, i64)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageHandler for Recording {
    async fn consume(&self, message: &ConsumerMessage) -> Result<(), HandlerError> {
        self.seen
            .lock()
            .unwrap()
            .push((message.partition, message.offset));
        self.inner.consume(message).await
    }

    fn name(&self) -> &'static str {
        "Recording"
    }
}

/// Takes a while per message and reports when it starts.
struct SlowHandler {
    started: AtomicBool,
    completed: AtomicUsize,
    delay: Duration,
}

#[async_trait]
impl MessageHandler for SlowHandler {
    async fn consume(&self, _message: &ConsumerMessage) -> Result<(), HandlerError> {
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SlowHandler"
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

fn contact(first_name: &str) -> CreateContactRequest {
    CreateContactRequest {
        user_id: "u1".to_string(),
        first_name: first_name.to_string(),
        ..Default::default()
    }
}

// =============================================================================
// Acknowledgment
// =============================================================================

#[tokio::test]
async fn events_written_by_use_cases_are_consumed_and_acknowledged() {
    let log = Arc::new(InMemoryEventLog::new(1));
    let contacts = ContactUseCase::new(
        Arc::new(InMemoryStore::new()),
        Some(Arc::new(ContactProducer::new(log.clone()))),
    );
    contacts.create(contact("Jane")).await.unwrap();
    contacts.create(contact("John")).await.unwrap();

    let group = Arc::new(log.consumer_group("contact-hub"));
    let handler = Arc::new(Recording::new(Arc::new(ContactConsumer::new("ContactConsumer"))));
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(consume_topic(
        group.clone(),
        "contacts",
        handler.clone(),
        rx,
        ConsumerLoopConfig::default(),
    ));
    wait_until(|| log.committed_offset("contact-hub", "contacts", 0) == Some(1)).await;

    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(handler.seen(), vec![(0, 0), (0, 1)]);
    assert!(group.is_closed());
}

#[tokio::test]
async fn undecodable_message_is_redelivered_to_the_next_session() {
    let log = Arc::new(InMemoryEventLog::new(1));
    log.send_message("contacts", "c-1", br#"{"id":"c-1"}"#).await.unwrap();
    log.send_message("contacts", "c-2", b"garbage").await.unwrap();
    log.send_message("contacts", "c-3", br#"{"id":"c-3"}"#).await.unwrap();

    // First worker: skips the bad message, keeps going.
    let first = Arc::new(Recording::new(Arc::new(ContactConsumer::new("ContactConsumer"))));
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(consume_topic(
        Arc::new(log.consumer_group("g")),
        "contacts",
        first.clone(),
        rx,
        ConsumerLoopConfig::default(),
    ));
    wait_until(|| first.seen().len() == 3).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(log.committed_offset("g", "contacts", 0), Some(0));

    // Second worker of the same group resumes after the watermark.
    let second = Arc::new(Recording::new(Arc::new(ContactConsumer::new("ContactConsumer"))));
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(consume_topic(
        Arc::new(log.consumer_group("g")),
        "contacts",
        second.clone(),
        rx,
        ConsumerLoopConfig::default(),
    ));
    wait_until(|| second.seen().len() >= 2).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(second.seen()[..2], [(0, 1), (0, 2)]);
}

#[tokio::test]
async fn groups_track_offsets_independently() {
    let log = Arc::new(InMemoryEventLog::new(2));
    for key in ["a", "b", "c", "d"] {
        log.send_message("users", key, br#"{"id":"x"}"#).await.unwrap();
    }

    let (tx, rx) = watch::channel(false);
    let mut tasks = Vec::new();
    let mut handlers = Vec::new();
    for group_id in ["audit", "search"] {
        let handler = Arc::new(Recording::new(Arc::new(UserConsumer::new("UserConsumer"))));
        handlers.push(handler.clone());
        tasks.push(tokio::spawn(consume_topic(
            Arc::new(log.consumer_group(group_id)),
            "users",
            handler,
            rx.clone(),
            ConsumerLoopConfig::default(),
        )));
    }

    wait_until(|| handlers.iter().all(|h| h.seen().len() == 4)).await;
    tx.send(true).unwrap();
    for task in tasks {
        task.await.unwrap();
    }
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test]
async fn shutdown_lets_running_handler_finish_and_pulls_nothing_more() {
    let log = Arc::new(InMemoryEventLog::new(1));
    for i in 0..3 {
        log.send_message("addresses", "k", format!("{}", i).as_bytes())
            .await
            .unwrap();
    }

    let group = Arc::new(log.consumer_group("g").with_batch_size(1));
    let handler = Arc::new(SlowHandler {
        started: AtomicBool::new(false),
        completed: AtomicUsize::new(0),
        delay: Duration::from_millis(100),
    });
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(consume_topic(
        group.clone(),
        "addresses",
        handler.clone(),
        rx,
        ConsumerLoopConfig::default(),
    ));
    wait_until(|| handler.started.load(Ordering::SeqCst)).await;
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(handler.completed.load(Ordering::SeqCst), 1);
    assert_eq!(log.committed_offset("g", "addresses", 0), Some(0));
    assert!(group.is_closed());
}

#[tokio::test]
async fn shutdown_interrupts_backoff_while_log_is_unavailable() {
    let log = Arc::new(InMemoryEventLog::new(1));
    log.set_unavailable(true);

    let group = Arc::new(log.consumer_group("g"));
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(consume_topic(
        group.clone(),
        "users",
        Arc::new(ContactConsumer::new("ContactConsumer")),
        rx,
        ConsumerLoopConfig::default().with_retry_backoff(Duration::from_secs(60)),
    ));

    tokio::time::sleep(Duration::from_millis(20)).await;
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap();
    assert!(group.is_closed());
}
