//! Redis Streams transport for the partitioned event log.
//!
//! # Layout
//!
//! Each (topic, partition) pair is one stream named `<topic>:<partition>`.
//! Appends run through a Lua script that increments a per-stream counter
//! (`<topic>:<partition>:offset`) and adds the entry with id `<counter>-0`
//! in one atomic step, so offsets are dense and the entry id encodes the
//! offset (`offset = counter - 1`).
//!
//! # Consumer groups
//!
//! Groups map onto Redis consumer groups, created on first use with
//! `XGROUP CREATE ... MKSTREAM`. A session first re-reads this consumer's
//! pending (delivered but unacknowledged) entries, then switches to new
//! entries with a blocking `XREADGROUP`. Marking a message is an `XACK`, so
//! a message whose handler failed stays pending and is redelivered by the
//! next session.
//!
//! Pending entries belong to a consumer name, so each worker instance needs
//! a stable name of its own. Entries left pending by a name that never comes
//! back are taken over with `XAUTOCLAIM` (Redis 6.2+) once they have been
//! idle for `claim_idle_ms`, then redelivered through the same pending read.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamId, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Script};
use tokio::sync::mpsc;

use super::partition_for;
use crate::config::{EventLogConfig, OffsetReset};
use crate::ports::{
    ConsumerGroup, ConsumerMessage, GroupSession, LogProducer, RecordPosition, TransportError,
};

const APPEND_SCRIPT: &str = r#"
local next = redis.call('INCR', KEYS[2])
redis.call('XADD', KEYS[1], next .. '-0', 'key', ARGV[1], 'value', ARGV[2])
return next
"#;

const KEY_FIELD: &str = "key";
const VALUE_FIELD: &str = "value";

fn stream_name(topic: &str, partition: i32) -> String {
    format!("{}:{}", topic, partition)
}

fn entry_id(offset: i64) -> String {
    format!("{}-0", offset + 1)
}

/// Offset encoded in an entry id of the form `<counter>-0`.
fn parse_offset(id: &str) -> Option<i64> {
    let (counter, sequence) = id.split_once('-')?;
    if sequence != "0" {
        return None;
    }
    counter.parse::<i64>().ok().map(|counter| counter - 1)
}

async fn connect(url: &str) -> Result<MultiplexedConnection, TransportError> {
    let client = redis::Client::open(url)
        .map_err(|e: redis::RedisError| TransportError::Unavailable(e.to_string()))?;
    client
        .get_multiplexed_tokio_connection()
        .await
        .map_err(|e: redis::RedisError| TransportError::Unavailable(e.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════
// Producer
// ════════════════════════════════════════════════════════════════════════════

/// Synchronous producer shared by every typed publisher.
#[derive(Clone)]
pub struct RedisStreamsProducer {
    conn: MultiplexedConnection,
    partitions: i32,
    send_timeout: Duration,
    append: Arc<Script>,
}

impl RedisStreamsProducer {
    pub fn new(conn: MultiplexedConnection, partitions: i32, send_timeout: Duration) -> Self {
        Self {
            conn,
            partitions: partitions.max(1),
            send_timeout,
            append: Arc::new(Script::new(APPEND_SCRIPT)),
        }
    }

    pub async fn connect(config: &EventLogConfig) -> Result<Self, TransportError> {
        let conn = connect(&config.url).await?;
        Ok(Self::new(conn, config.partitions, config.send_timeout()))
    }
}

#[async_trait]
impl LogProducer for RedisStreamsProducer {
    async fn send_message(
        &self,
        topic: &str,
        key: &str,
        value: &[u8],
    ) -> Result<RecordPosition, TransportError> {
        let partition = partition_for(key, self.partitions);
        let stream = stream_name(topic, partition);
        let counter_key = format!("{}:offset", stream);

        let mut invocation = self.append.key(&stream);
        invocation.key(&counter_key).arg(key).arg(value);

        let mut conn = self.conn.clone();
        let counter: i64 = tokio::time::timeout(self.send_timeout, invocation.invoke_async(&mut conn))
            .await
            .map_err(|_| TransportError::Timeout(self.send_timeout.as_millis() as u64))?
            .map_err(|e: redis::RedisError| TransportError::Unavailable(e.to_string()))?;

        Ok(RecordPosition {
            partition,
            offset: counter - 1,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Consumer group
// ════════════════════════════════════════════════════════════════════════════

type ErrorSender = Arc<Mutex<Option<mpsc::UnboundedSender<TransportError>>>>;

fn report(errors: &ErrorSender, error: TransportError) {
    if let Ok(guard) = errors.lock() {
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(error);
        }
    }
}

/// Member handle of a Redis consumer group.
///
/// Holds its own connection: a blocking `XREADGROUP` occupies the
/// connection for its whole duration.
pub struct RedisConsumerGroup {
    conn: MultiplexedConnection,
    group_id: String,
    consumer_name: String,
    start_id: &'static str,
    partitions: i32,
    batch_size: usize,
    block_ms: usize,
    claim_idle_ms: Option<u64>,
    closed: Arc<AtomicBool>,
    errors_tx: ErrorSender,
    errors_rx: Mutex<Option<mpsc::UnboundedReceiver<TransportError>>>,
}

impl RedisConsumerGroup {
    pub fn new(conn: MultiplexedConnection, config: &EventLogConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            conn,
            group_id: config.group_id.clone(),
            consumer_name: config.consumer_name.clone(),
            start_id: match config.auto_offset_reset {
                OffsetReset::Earliest => "0",
                OffsetReset::Latest => "$",
            },
            partitions: config.partitions.max(1),
            batch_size: config.batch_size.max(1),
            block_ms: config.block_ms as usize,
            claim_idle_ms: config.claim_idle().map(|idle| idle.as_millis() as u64),
            closed: Arc::new(AtomicBool::new(false)),
            errors_tx: Arc::new(Mutex::new(Some(tx))),
            errors_rx: Mutex::new(Some(rx)),
        }
    }

    pub async fn connect(config: &EventLogConfig) -> Result<Self, TransportError> {
        let conn = connect(&config.url).await?;
        Ok(Self::new(conn, config))
    }

    async fn ensure_group(&self, stream: &str) -> Result<(), TransportError> {
        let mut conn = self.conn.clone();
        let created: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(stream, &self.group_id, self.start_id)
            .await;

        match created {
            Ok(()) => {
                tracing::info!(stream, group = %self.group_id, "Created consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(TransportError::Unavailable(e.to_string())),
        }
    }

    /// Moves entries idle for at least `claim_idle_ms` to this consumer.
    async fn reclaim_idle(&self, stream: &str) -> Result<usize, TransportError> {
        let Some(min_idle_ms) = self.claim_idle_ms else {
            return Ok(0);
        };

        let mut conn = self.conn.clone();
        let mut cursor = "0-0".to_string();
        let mut claimed = 0;
        loop {
            let reply: redis::Value = redis::cmd("XAUTOCLAIM")
                .arg(stream)
                .arg(&self.group_id)
                .arg(&self.consumer_name)
                .arg(min_idle_ms)
                .arg(&cursor)
                .arg("COUNT")
                .arg(self.batch_size)
                .arg("JUSTID")
                .query_async(&mut conn)
                .await
                .map_err(|e: redis::RedisError| TransportError::Unavailable(e.to_string()))?;

            let (next, ids) = parse_autoclaim(&reply)?;
            claimed += ids;
            if next == "0-0" {
                return Ok(claimed);
            }
            cursor = next;
        }
    }
}

/// Next cursor and number of claimed ids in an `XAUTOCLAIM ... JUSTID` reply.
fn parse_autoclaim(reply: &redis::Value) -> Result<(String, usize), TransportError> {
    let unexpected = || TransportError::Protocol("unexpected XAUTOCLAIM reply".to_string());

    let redis::Value::Bulk(parts) = reply else {
        return Err(unexpected());
    };
    let cursor: String = parts
        .first()
        .and_then(|v| redis::from_redis_value(v).ok())
        .ok_or_else(unexpected)?;
    match parts.get(1) {
        Some(redis::Value::Bulk(ids)) => Ok((cursor, ids.len())),
        _ => Err(unexpected()),
    }
}

#[async_trait]
impl ConsumerGroup for RedisConsumerGroup {
    async fn consume(&self, topics: &[String]) -> Result<Box<dyn GroupSession>, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        let mut claims = Vec::new();
        for topic in topics {
            for partition in 0..self.partitions {
                let stream = stream_name(topic, partition);
                self.ensure_group(&stream).await?;
                let claimed = self.reclaim_idle(&stream).await?;
                if claimed > 0 {
                    tracing::info!(
                        stream = %stream,
                        consumer = %self.consumer_name,
                        claimed,
                        "Took over idle pending entries"
                    );
                }
                claims.push(StreamClaim {
                    stream,
                    topic: topic.clone(),
                    partition,
                    backlog_cursor: "0".to_string(),
                });
            }
        }

        Ok(Box::new(RedisGroupSession {
            conn: self.conn.clone(),
            group_id: self.group_id.clone(),
            consumer_name: self.consumer_name.clone(),
            batch_size: self.batch_size,
            block_ms: self.block_ms,
            draining_backlog: true,
            claims,
            closed: self.closed.clone(),
            errors: self.errors_tx.clone(),
        }))
    }

    fn take_errors(&self) -> Option<mpsc::UnboundedReceiver<TransportError>> {
        self.errors_rx.lock().ok().and_then(|mut rx| rx.take())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        if let Ok(mut tx) = self.errors_tx.lock() {
            tx.take();
        }
        Ok(())
    }
}

struct StreamClaim {
    stream: String,
    topic: String,
    partition: i32,
    backlog_cursor: String,
}

struct RedisGroupSession {
    conn: MultiplexedConnection,
    group_id: String,
    consumer_name: String,
    batch_size: usize,
    block_ms: usize,
    draining_backlog: bool,
    claims: Vec<StreamClaim>,
    closed: Arc<AtomicBool>,
    errors: ErrorSender,
}

impl RedisGroupSession {
    fn decode(&mut self, reply: StreamReadReply) -> Vec<ConsumerMessage> {
        let claim_index: HashMap<&str, usize> = self
            .claims
            .iter()
            .enumerate()
            .map(|(i, claim)| (claim.stream.as_str(), i))
            .collect();

        let mut cursors = Vec::new();
        let mut batch = Vec::new();
        for stream_key in reply.keys {
            let Some(&index) = claim_index.get(stream_key.key.as_str()) else {
                continue;
            };
            let claim = &self.claims[index];

            for entry in &stream_key.ids {
                cursors.push((index, entry.id.clone()));
                match decode_entry(claim, entry) {
                    Ok(message) => batch.push(message),
                    Err(e) => report(&self.errors, e),
                }
            }
        }

        if self.draining_backlog {
            for (index, id) in cursors {
                self.claims[index].backlog_cursor = id;
            }
        }

        batch
    }
}

fn decode_entry(claim: &StreamClaim, entry: &StreamId) -> Result<ConsumerMessage, TransportError> {
    let malformed = |reason: &str| {
        TransportError::Protocol(format!("entry {} on {}: {}", entry.id, claim.stream, reason))
    };

    let offset = parse_offset(&entry.id).ok_or_else(|| malformed("unexpected entry id"))?;
    let value = entry
        .map
        .get(VALUE_FIELD)
        .ok_or_else(|| malformed("missing value field"))
        .and_then(|v| {
            redis::from_redis_value::<Vec<u8>>(v).map_err(|_| malformed("value is not binary"))
        })?;
    let key = entry
        .map
        .get(KEY_FIELD)
        .and_then(|v| redis::from_redis_value::<String>(v).ok());

    Ok(ConsumerMessage {
        topic: claim.topic.clone(),
        partition: claim.partition,
        offset,
        key,
        value,
    })
}

#[async_trait]
impl GroupSession for RedisGroupSession {
    async fn next_batch(&mut self) -> Result<Option<Vec<ConsumerMessage>>, TransportError> {
        loop {
            if self.closed.load(Ordering::SeqCst) {
                return Ok(None);
            }

            let keys: Vec<&str> = self.claims.iter().map(|c| c.stream.as_str()).collect();
            let ids: Vec<&str> = if self.draining_backlog {
                self.claims.iter().map(|c| c.backlog_cursor.as_str()).collect()
            } else {
                vec![">"; self.claims.len()]
            };

            let mut options = StreamReadOptions::default()
                .group(&self.group_id, &self.consumer_name)
                .count(self.batch_size);
            if !self.draining_backlog {
                options = options.block(self.block_ms);
            }

            let reply: Option<StreamReadReply> = self
                .conn
                .xread_options(&keys, &ids, &options)
                .await
                .map_err(|e: redis::RedisError| TransportError::Unavailable(e.to_string()))?;

            let entries = reply.as_ref().map_or(0, |r| r.keys.iter().map(|k| k.ids.len()).sum::<usize>());
            if entries == 0 {
                if self.draining_backlog {
                    tracing::debug!(group = %self.group_id, "Pending entries drained");
                    self.draining_backlog = false;
                }
                continue;
            }

            let batch = match reply {
                Some(reply) => self.decode(reply),
                None => Vec::new(),
            };
            if !batch.is_empty() {
                return Ok(Some(batch));
            }
        }
    }

    async fn mark_message(&mut self, message: &ConsumerMessage) -> Result<(), TransportError> {
        let stream = stream_name(&message.topic, message.partition);
        let _: i64 = self
            .conn
            .xack(&stream, &self.group_id, &[entry_id(message.offset)])
            .await
            .map_err(|e: redis::RedisError| TransportError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
