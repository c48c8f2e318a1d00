//! In-memory partitioned event log for testing.
//!
//! Provides the producer and consumer-group ports over process memory with
//! the same offset semantics as the real transport.
//!
//! # Offsets
//!
//! Each partition is a dense append-only vector; a record's offset is its
//! index. Every consumer group keeps one committed watermark per partition.
//! Marking a message records its offset, and the watermark only advances
//! across a contiguous run of marked offsets, so an unmarked (failed)
//! message pins the watermark just below it. A new session resumes after
//! the watermark, which redelivers everything that was not acknowledged.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use super::partition_for;
use crate::ports::{
    ConsumerGroup, ConsumerMessage, GroupSession, LogProducer, RecordPosition, TransportError,
};

const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
struct StoredRecord {
    key: String,
    value: Vec<u8>,
}

#[derive(Debug, Default)]
struct PartitionCursor {
    committed: i64,
    marked: BTreeSet<i64>,
}

impl PartitionCursor {
    fn new() -> Self {
        Self {
            committed: -1,
            marked: BTreeSet::new(),
        }
    }

    fn mark(&mut self, offset: i64) {
        if offset <= self.committed {
            return;
        }
        self.marked.insert(offset);
        while self.marked.remove(&(self.committed + 1)) {
            self.committed += 1;
        }
    }
}

#[derive(Debug, Default)]
struct GroupState {
    generation: u64,
    cursors: HashMap<(String, i32), PartitionCursor>,
}

#[derive(Debug, Default)]
struct LogState {
    topics: HashMap<String, Vec<Vec<StoredRecord>>>,
    groups: HashMap<String, GroupState>,
    unavailable: bool,
}

/// In-memory partitioned log.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
///
/// # Example
///
/// ```ignore
/// let log = Arc::new(InMemoryEventLog::new(3));
/// let producer = UserProducer::new(log.clone());
/// let group = Arc::new(log.consumer_group("workers"));
///
/// producer.send(&event).await?;
/// assert_eq!(log.sent_count(), 1);
/// ```
pub struct InMemoryEventLog {
    partitions: i32,
    state: Mutex<LogState>,
    notify: Notify,
    send_attempts: AtomicUsize,
    sent: AtomicUsize,
}

impl InMemoryEventLog {
    /// Creates an empty log whose topics all have `partitions` partitions.
    pub fn new(partitions: i32) -> Self {
        Self {
            partitions: partitions.max(1),
            state: Mutex::new(LogState::default()),
            notify: Notify::new(),
            send_attempts: AtomicUsize::new(0),
            sent: AtomicUsize::new(0),
        }
    }

    /// Creates a member handle for the named consumer group.
    pub fn consumer_group(self: &Arc<Self>, group_id: impl Into<String>) -> InMemoryConsumerGroup {
        InMemoryConsumerGroup::new(self.clone(), group_id.into(), DEFAULT_BATCH_SIZE)
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state
            .lock()
            .expect("InMemoryEventLog: state lock poisoned")
    }

    // === Test Helpers ===

    /// Makes every send and read fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
        self.notify.notify_waiters();
    }

    /// Ends every open session of `group_id`, as a broker rebalance would.
    pub fn rebalance(&self, group_id: &str) {
        self.lock()
            .groups
            .entry(group_id.to_string())
            .or_default()
            .generation += 1;
        self.notify.notify_waiters();
    }

    /// Number of `send_message` calls, successful or not.
    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    /// Number of messages appended.
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// All messages of `topic`, ordered by partition then offset.
    pub fn messages(&self, topic: &str) -> Vec<ConsumerMessage> {
        let state = self.lock();
        let Some(partitions) = state.topics.get(topic) else {
            return Vec::new();
        };

        partitions
            .iter()
            .enumerate()
            .flat_map(|(partition, records)| {
                records
                    .iter()
                    .enumerate()
                    .map(move |(offset, record)| to_message(topic, partition as i32, offset as i64, record))
            })
            .collect()
    }

    /// Highest contiguously acknowledged offset, `None` if nothing was acknowledged.
    pub fn committed_offset(&self, group_id: &str, topic: &str, partition: i32) -> Option<i64> {
        self.lock()
            .groups
            .get(group_id)
            .and_then(|group| group.cursors.get(&(topic.to_string(), partition)))
            .map(|cursor| cursor.committed)
            .filter(|committed| *committed >= 0)
    }
}

fn to_message(topic: &str, partition: i32, offset: i64, record: &StoredRecord) -> ConsumerMessage {
    ConsumerMessage {
        topic: topic.to_string(),
        partition,
        offset,
        key: Some(record.key.clone()),
        value: record.value.clone(),
    }
}

#[async_trait]
impl LogProducer for InMemoryEventLog {
    async fn send_message(
        &self,
        topic: &str,
        key: &str,
        value: &[u8],
    ) -> Result<RecordPosition, TransportError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);

        let position = {
            let mut state = self.lock();
            if state.unavailable {
                return Err(TransportError::Unavailable("in-memory log is offline".to_string()));
            }

            let partition = partition_for(key, self.partitions);
            let partitions = state
                .topics
                .entry(topic.to_string())
                .or_insert_with(|| vec![Vec::new(); self.partitions as usize]);
            let records = &mut partitions[partition as usize];
            records.push(StoredRecord {
                key: key.to_string(),
                value: value.to_vec(),
            });

            RecordPosition {
                partition,
                offset: records.len() as i64 - 1,
            }
        };

        self.sent.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
        Ok(position)
    }
}

/// Member handle of an in-memory consumer group.
///
/// A session claims every partition of the requested topics.
pub struct InMemoryConsumerGroup {
    log: Arc<InMemoryEventLog>,
    group_id: String,
    batch_size: usize,
    closed: Arc<AtomicBool>,
    errors_tx: Mutex<Option<mpsc::UnboundedSender<TransportError>>>,
    errors_rx: Mutex<Option<mpsc::UnboundedReceiver<TransportError>>>,
}

impl InMemoryConsumerGroup {
    fn new(log: Arc<InMemoryEventLog>, group_id: String, batch_size: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            log,
            group_id,
            batch_size,
            closed: Arc::new(AtomicBool::new(false)),
            errors_tx: Mutex::new(Some(tx)),
            errors_rx: Mutex::new(Some(rx)),
        }
    }

    /// Caps the number of messages per batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    // === Test Helpers ===

    /// Pushes an error onto the asynchronous error channel.
    pub fn inject_error(&self, error: TransportError) {
        if let Some(tx) = self
            .errors_tx
            .lock()
            .expect("InMemoryConsumerGroup: errors lock poisoned")
            .as_ref()
        {
            let _ = tx.send(error);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsumerGroup for InMemoryConsumerGroup {
    async fn consume(&self, topics: &[String]) -> Result<Box<dyn GroupSession>, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        let mut state = self.log.lock();
        if state.unavailable {
            return Err(TransportError::Unavailable("in-memory log is offline".to_string()));
        }

        let group = state.groups.entry(self.group_id.clone()).or_default();
        let mut positions = Vec::new();
        for topic in topics {
            for partition in 0..self.log.partitions {
                let cursor = group
                    .cursors
                    .entry((topic.clone(), partition))
                    .or_insert_with(PartitionCursor::new);
                positions.push(ClaimedPartition {
                    topic: topic.clone(),
                    partition,
                    next_offset: cursor.committed + 1,
                });
            }
        }

        Ok(Box::new(InMemoryGroupSession {
            log: self.log.clone(),
            group_id: self.group_id.clone(),
            generation: group.generation,
            batch_size: self.batch_size,
            closed: self.closed.clone(),
            claims: positions,
        }))
    }

    fn take_errors(&self) -> Option<mpsc::UnboundedReceiver<TransportError>> {
        self.errors_rx
            .lock()
            .expect("InMemoryConsumerGroup: errors lock poisoned")
            .take()
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        self.errors_tx
            .lock()
            .expect("InMemoryConsumerGroup: errors lock poisoned")
            .take();
        self.log.notify.notify_waiters();
        Ok(())
    }
}

struct ClaimedPartition {
    topic: String,
    partition: i32,
    next_offset: i64,
}

struct InMemoryGroupSession {
    log: Arc<InMemoryEventLog>,
    group_id: String,
    generation: u64,
    batch_size: usize,
    closed: Arc<AtomicBool>,
    claims: Vec<ClaimedPartition>,
}

impl InMemoryGroupSession {
    /// `Ok(None)` once the claim is gone, otherwise whatever is available now.
    fn poll_batch(&mut self) -> Result<Option<Vec<ConsumerMessage>>, TransportError> {
        let state = self.log.lock();

        if self.closed.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let generation = state.groups.get(&self.group_id).map(|g| g.generation);
        if generation != Some(self.generation) {
            return Ok(None);
        }
        if state.unavailable {
            return Err(TransportError::Unavailable("in-memory log is offline".to_string()));
        }

        let mut batch = Vec::new();
        for claim in &mut self.claims {
            let Some(records) = state
                .topics
                .get(&claim.topic)
                .and_then(|partitions| partitions.get(claim.partition as usize))
            else {
                continue;
            };

            while batch.len() < self.batch_size {
                let Some(record) = records.get(claim.next_offset as usize) else {
                    break;
                };
                batch.push(to_message(&claim.topic, claim.partition, claim.next_offset, record));
                claim.next_offset += 1;
            }
        }

        Ok(Some(batch))
    }
}

#[async_trait]
impl GroupSession for InMemoryGroupSession {
    async fn next_batch(&mut self) -> Result<Option<Vec<ConsumerMessage>>, TransportError> {
        let log = self.log.clone();
        loop {
            let notified = log.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.poll_batch()? {
                Some(batch) if batch.is_empty() => notified.await,
                other => return Ok(other),
            }
        }
    }

    async fn mark_message(&mut self, message: &ConsumerMessage) -> Result<(), TransportError> {
        let mut state = self.log.lock();
        let group = state.groups.entry(self.group_id.clone()).or_default();
        group
            .cursors
            .entry((message.topic.clone(), message.partition))
            .or_insert_with(PartitionCursor::new)
            .mark(message.offset);
        Ok(())
    }
}
