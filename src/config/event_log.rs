//! Event log transport configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Where a new consumer group starts reading.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OffsetReset {
    #[default]
    Earliest,
    Latest,
}

/// Redis Streams transport, shared by the producer and the worker
#[derive(Debug, Clone, Deserialize)]
pub struct EventLogConfig {
    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// When false the API runs with announcements disabled
    #[serde(default = "default_producer_enabled")]
    pub producer_enabled: bool,

    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Consumer name inside the group.
    ///
    /// Pending entries belong to a name, so each worker instance needs its own
    /// name and must keep it across restarts to pick its pending entries back up.
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    #[serde(default)]
    pub auto_offset_reset: OffsetReset,

    /// Partitions per destination stream
    #[serde(default = "default_partitions")]
    pub partitions: i32,

    /// Maximum messages per pull
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How long a pull waits for new entries, in milliseconds
    #[serde(default = "default_block_ms")]
    pub block_ms: u64,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Entries another consumer left pending this long are taken over when a
    /// session starts. 0 disables the takeover.
    #[serde(default = "default_claim_idle_ms")]
    pub claim_idle_ms: u64,

    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl EventLogConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn claim_idle(&self) -> Option<Duration> {
        (self.claim_idle_ms > 0).then(|| Duration::from_millis(self.claim_idle_ms))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("CONTACT_HUB__EVENT_LOG__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidEventLogUrl);
        }
        if self.group_id.is_empty() {
            return Err(ValidationError::MissingRequired("CONTACT_HUB__EVENT_LOG__GROUP_ID"));
        }
        if self.consumer_name.is_empty() {
            return Err(ValidationError::MissingRequired(
                "CONTACT_HUB__EVENT_LOG__CONSUMER_NAME",
            ));
        }
        if !(1..=1024).contains(&self.partitions) {
            return Err(ValidationError::InvalidPartitions);
        }
        if !(1..=10_000).contains(&self.batch_size) {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.send_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            producer_enabled: default_producer_enabled(),
            group_id: default_group_id(),
            consumer_name: default_consumer_name(),
            auto_offset_reset: OffsetReset::default(),
            partitions: default_partitions(),
            batch_size: default_batch_size(),
            block_ms: default_block_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
            claim_idle_ms: default_claim_idle_ms(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

fn default_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_producer_enabled() -> bool {
    true
}

fn default_group_id() -> String {
    "contact-hub".to_string()
}

fn default_consumer_name() -> String {
    "contact-hub-worker".to_string()
}

fn default_partitions() -> i32 {
    3
}

fn default_batch_size() -> usize {
    100
}

fn default_block_ms() -> u64 {
    1000
}

fn default_retry_backoff_ms() -> u64 {
    2000
}

fn default_claim_idle_ms() -> u64 {
    60_000
}

fn default_send_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EventLogConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.producer_enabled);
        assert_eq!(config.auto_offset_reset, OffsetReset::Earliest);
        assert_eq!(config.retry_backoff(), Duration::from_secs(2));
        assert_eq!(config.claim_idle(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn zero_claim_idle_disables_takeover() {
        let config = EventLogConfig {
            claim_idle_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.claim_idle(), None);
    }

    #[test]
    fn rejects_empty_consumer_name() {
        let config = EventLogConfig {
            consumer_name: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(
                "CONTACT_HUB__EVENT_LOG__CONSUMER_NAME"
            ))
        ));
    }

    #[test]
    fn rejects_non_redis_url() {
        let config = EventLogConfig {
            url: "kafka://localhost:9092".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidEventLogUrl)
        ));
    }

    #[test]
    fn rejects_zero_partitions() {
        let config = EventLogConfig {
            partitions: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPartitions)
        ));
    }

    #[test]
    fn offset_reset_parses_lowercase() {
        let reset: OffsetReset = serde_json::from_str("\"latest\"").unwrap();
        assert_eq!(reset, OffsetReset::Latest);
    }
}
