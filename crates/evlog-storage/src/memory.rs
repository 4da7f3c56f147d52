//! In-memory storage implementation
//!
//! Suitable for tests and for logs that do not need to survive the
//! process.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use evlog_core::EventRecord;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::StorageError;
use crate::query::Predicate;
use crate::{RecordStore, StoredRecord};

#[derive(Debug, Default)]
struct Inner {
    /// Index in this vector is the commit sequence
    records: Vec<EventRecord>,
    ids: HashMap<String, u64>,
}

/// In-memory implementation of RecordStore
///
/// Records and the id index live behind a single lock, so readers always
/// see both updated together.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    /// Create a new in-memory record store
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn append(&self, record: &EventRecord) -> Result<u64, StorageError> {
        let mut inner = self.inner.write();
        if inner.ids.contains_key(record.id()) {
            return Err(StorageError::DuplicateId(record.id().to_string()));
        }

        let sequence = inner.records.len() as u64;
        inner.ids.insert(record.id().to_string(), sequence);
        inner.records.push(record.clone());

        trace!(log_id = %record.id(), sequence, "Appended record");
        Ok(sequence)
    }

    fn get(&self, log_id: &str) -> Result<Option<EventRecord>, StorageError> {
        let inner = self.inner.read();
        Ok(inner
            .ids
            .get(log_id)
            .and_then(|&seq| inner.records.get(seq as usize))
            .cloned())
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.inner.read().records.len())
    }

    fn scan(&self, predicate: &Predicate) -> Result<Vec<StoredRecord>, StorageError> {
        let inner = self.inner.read();
        Ok(inner
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| predicate.matches(record))
            .map(|(seq, record)| StoredRecord {
                sequence: seq as u64,
                record: record.clone(),
            })
            .collect())
    }

    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self.inner.read().records.iter().map(EventRecord::created_at).max())
    }
}
