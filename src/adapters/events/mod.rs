//! Event log adapters.
//!
//! Adapters implement the event publishing and consuming ports
//! for different environments:
//!
//! - `Producer<E>` - Typed publisher bound to one destination stream
//! - `RedisStreamsProducer` / `RedisConsumerGroup` - Redis Streams transport
//! - `InMemoryEventLog` - In-process partitioned log for testing
//! - `consume_topic` - Consumer loop with manual acknowledgment
//! - `EventConsumer<E>` - Per-stream dispatch handlers

mod consumer;
mod handlers;
mod in_memory_log;
mod partitioner;
mod producer;
mod redis_streams;

pub use consumer::{consume_topic, ConsumerLoopConfig};
pub use handlers::{
    handler_for_topic, AddressConsumer, ContactConsumer, EventConsumer, UserConsumer,
};
pub use in_memory_log::{InMemoryConsumerGroup, InMemoryEventLog};
pub use partitioner::{fnv1a_32, partition_for};
pub use producer::{AddressProducer, ContactProducer, Producer, UserProducer};
pub use redis_streams::{RedisConsumerGroup, RedisStreamsProducer};
