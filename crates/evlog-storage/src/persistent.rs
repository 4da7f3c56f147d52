//! Persistent storage using redb
//!
//! ## Tables
//!
//! - `records`: commit sequence (`u64`) → rendered JSON payload
//! - `record_ids`: log id → commit sequence
//!
//! The rendered payload is the stored form of the record; loading parses
//! it back without rendering again. Both tables are written in the same
//! transaction, so a record is either fully committed (payload and id
//! index) or not present at all. Reads run in redb read transactions and
//! therefore see a consistent snapshot that excludes in-flight commits.

use std::path::PathBuf;

use evlog_core::EventRecord;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::{debug, info, instrument, warn};

use crate::error::StorageError;
use crate::query::Predicate;
use crate::{RecordStore, StoredRecord};

// Key: commit sequence, Value: rendered JSON payload
const RECORDS: TableDefinition<u64, &str> = TableDefinition::new("records");

// Key: log id, Value: commit sequence
const RECORD_IDS: TableDefinition<&str, u64> = TableDefinition::new("record_ids");

/// Configuration for redb storage
#[derive(Debug, Clone)]
pub struct RedbStoreConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    /// Cache size in bytes
    pub cache_size: usize,
}

impl Default for RedbStoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/evlog.redb"),
            cache_size: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl RedbStoreConfig {
    /// Create a configuration for a specific database file
    pub fn with_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Default::default()
        }
    }
}

/// Durable implementation of RecordStore
pub struct RedbRecordStore {
    db: Database,
    config: RedbStoreConfig,
}

impl RedbRecordStore {
    /// Open or create the database
    #[instrument(skip(config), fields(path = %config.db_path.display()))]
    pub fn open(config: RedbStoreConfig) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = config.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::builder()
            .set_cache_size(config.cache_size)
            .create(&config.db_path)?;

        let store = Self { db, config };
        store.init_tables()?;

        info!(records = store.count()?, "Opened record store");
        Ok(store)
    }

    /// Create tables if they don't exist
    fn init_tables(&self) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write()?;
        write_txn.open_table(RECORDS)?;
        write_txn.open_table(RECORD_IDS)?;
        write_txn.commit()?;

        debug!("Initialized redb tables");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &RedbStoreConfig {
        &self.config
    }

    fn parse(sequence: u64, payload: &str) -> Result<EventRecord, StorageError> {
        EventRecord::from_payload(payload).map_err(|e| {
            warn!(sequence, error = %e, "Unreadable record payload");
            StorageError::deserialization(format!("record {sequence}: {e}"))
        })
    }
}

impl RecordStore for RedbRecordStore {
    fn append(&self, record: &EventRecord) -> Result<u64, StorageError> {
        let write_txn = self.db.begin_write()?;

        let sequence = {
            let mut ids = write_txn.open_table(RECORD_IDS)?;
            if ids.get(record.id())?.is_some() {
                drop(ids);
                write_txn.abort()?;
                return Err(StorageError::DuplicateId(record.id().to_string()));
            }

            let mut records = write_txn.open_table(RECORDS)?;
            let sequence = match records.last()? {
                Some((last, _)) => last.value() + 1,
                None => 0,
            };

            records.insert(sequence, record.rendered_payload())?;
            ids.insert(record.id(), sequence)?;
            sequence
        };

        write_txn.commit()?;

        debug!(log_id = %record.id(), sequence, "Committed record");
        Ok(sequence)
    }

    fn get(&self, log_id: &str) -> Result<Option<EventRecord>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let ids = read_txn.open_table(RECORD_IDS)?;

        let Some(sequence) = ids.get(log_id)?.map(|guard| guard.value()) else {
            return Ok(None);
        };

        let records = read_txn.open_table(RECORDS)?;
        match records.get(sequence)? {
            Some(payload) => Self::parse(sequence, payload.value()).map(Some),
            None => Err(StorageError::database(format!(
                "id index points at missing record {sequence}"
            ))),
        }
    }

    fn count(&self) -> Result<usize, StorageError> {
        let read_txn = self.db.begin_read()?;
        let records = read_txn.open_table(RECORDS)?;
        Ok(records.len()? as usize)
    }

    fn scan(&self, predicate: &Predicate) -> Result<Vec<StoredRecord>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let records = read_txn.open_table(RECORDS)?;

        let mut matches = Vec::new();
        for entry in records.iter()? {
            let (key, value) = entry?;
            let sequence = key.value();
            let record = Self::parse(sequence, value.value())?;
            if predicate.matches(&record) {
                matches.push(StoredRecord { sequence, record });
            }
        }

        Ok(matches)
    }
}
