//! Configuration for the event logger

use std::path::PathBuf;
use std::time::Duration;

use evlog_core::LogsConfig;
use evlog_storage::RedbStoreConfig;

/// Default capacity of the write channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Default period between device context refreshes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Default prefix of messages forwarded to the system log sink
pub const DEFAULT_SINK_PREFIX: &str = "EventLogger";

/// Which record store backs the logger
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Records live only as long as the logger
    InMemory,
    /// Durable redb database
    Redb(RedbStoreConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Redb(RedbStoreConfig::default())
    }
}

/// Configuration for an EventLogger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Record store backend
    pub storage: StorageConfig,
    /// Submissions that may wait for the writer before `enqueue` reports a full queue
    pub channel_capacity: usize,
    /// Device context polling period; `None` disables periodic refresh
    pub refresh_interval: Option<Duration>,
    /// Prefix of messages forwarded to the system log sink
    pub sink_prefix: String,
    /// Query run by `fetch`
    pub logs: LogsConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            refresh_interval: Some(DEFAULT_REFRESH_INTERVAL),
            sink_prefix: DEFAULT_SINK_PREFIX.to_string(),
            logs: LogsConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Configuration backed by an in-memory store
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::InMemory,
            ..Default::default()
        }
    }

    /// Configuration backed by a redb database at `db_path`
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::Redb(RedbStoreConfig::with_path(db_path)),
            ..Default::default()
        }
    }

    /// Set the storage configuration
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Set the write channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the context refresh interval
    pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the system log message prefix
    pub fn with_sink_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sink_prefix = prefix.into();
        self
    }

    /// Set the query used by `fetch`
    pub fn with_logs_config(mut self, logs: LogsConfig) -> Self {
        self.logs = logs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.sink_prefix, "EventLogger");
        assert!(matches!(
            config.storage,
            StorageConfig::Redb(ref redb) if redb.db_path == PathBuf::from("./data/evlog.redb")
        ));
    }

    #[test]
    fn test_builder_chain() {
        let config = LoggerConfig::in_memory()
            .with_channel_capacity(8)
            .with_refresh_interval(None)
            .with_sink_prefix("App");
        assert!(matches!(config.storage, StorageConfig::InMemory));
        assert_eq!(config.channel_capacity, 8);
        assert!(config.refresh_interval.is_none());
        assert_eq!(config.sink_prefix, "App");
    }
}
