//! # Evlog Storage
//!
//! Record stores and the query engine for evlog.
//!
//! ## Features
//!
//! - **RecordStore trait**: append-only storage of committed event records
//! - **InMemoryRecordStore**: in-memory implementation for tests and ephemeral logs
//! - **RedbRecordStore**: durable implementation backed by redb
//! - **Query engine**: predicate tree, newest-first ordering, cap and pagination
//!
//! ## Example
//!
//! ```rust,ignore
//! use evlog_core::FilterConfig;
//! use evlog_storage::{InMemoryRecordStore, query};
//!
//! let store = InMemoryRecordStore::new();
//! // ... records appended by the write path ...
//!
//! let config = FilterConfig::new()
//!     .with_filter("log_level", ["error", "fault"])
//!     .with_events_count(100)
//!     .with_page_size(20);
//! let pages = query(&store, &config)?;
//! ```

pub mod error;
pub mod memory;
pub mod persistent;
pub mod query;

// Re-exports
pub use error::{QueryError, StorageError};
pub use memory::InMemoryRecordStore;
pub use persistent::{RedbRecordStore, RedbStoreConfig};
pub use query::{Page, Predicate, paginate, query};

use chrono::{DateTime, Utc};
use evlog_core::EventRecord;

/// A committed record together with its commit sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Position in commit order, starting at zero
    pub sequence: u64,
    pub record: EventRecord,
}

/// Append-only storage of committed event records
///
/// Implementations must:
/// - reject a record whose id is already stored, leaving the store unchanged
/// - make an appended record visible to readers all at once, never partially
/// - serve each [`scan`](RecordStore::scan) from one consistent snapshot
///
/// Records are never updated or deleted.
pub trait RecordStore: Send + Sync {
    /// Append a record, returning its commit sequence
    fn append(&self, record: &EventRecord) -> Result<u64, StorageError>;

    /// Look a record up by id
    fn get(&self, log_id: &str) -> Result<Option<EventRecord>, StorageError>;

    /// Number of committed records
    fn count(&self) -> Result<usize, StorageError>;

    /// All records matching the predicate, in commit order
    fn scan(&self, predicate: &Predicate) -> Result<Vec<StoredRecord>, StorageError>;

    /// Newest `created_at` among committed records, `None` when empty
    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self
            .scan(&Predicate::True)?
            .into_iter()
            .map(|stored| stored.record.created_at())
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that the RecordStore trait is object-safe
    fn _assert_object_safe(_: &dyn RecordStore) {}
}
