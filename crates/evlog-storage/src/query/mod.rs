//! Query engine
//!
//! Runs a [`FilterConfig`] against a [`RecordStore`]:
//!
//! 1. build a conjunctive [`Predicate`] (unknown fields fail the query)
//! 2. collect matching records from one consistent store snapshot
//! 3. order newest first; equal timestamps put the later commit first
//! 4. keep at most `events_count` records
//! 5. split into pages of `page_size` (zero or negative: one page)
//!
//! The result is built completely before it is returned; a failing query
//! yields an error and no pages.

mod predicate;

pub use predicate::Predicate;

use evlog_core::{EventRecord, FilterConfig};
use tracing::debug;

use crate::RecordStore;
use crate::error::QueryError;

/// One chunk of a query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Zero-based position of this page in the result
    pub index: usize,
    pub records: Vec<EventRecord>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }
}

impl IntoIterator for Page {
    type Item = EventRecord;
    type IntoIter = std::vec::IntoIter<EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Run a filter configuration against a store
pub fn query(store: &dyn RecordStore, config: &FilterConfig) -> Result<Vec<Page>, QueryError> {
    let predicate = Predicate::from_config(config)?;
    debug!(%predicate, events_count = config.events_count, page_size = config.page_size, "Running query");

    if config.events_count == 0 {
        return Ok(Vec::new());
    }

    let mut matches = store.scan(&predicate)?;
    matches.sort_by(|a, b| {
        b.record
            .created_at()
            .cmp(&a.record.created_at())
            .then(b.sequence.cmp(&a.sequence))
    });
    matches.truncate(config.events_count);

    let records: Vec<EventRecord> = matches.into_iter().map(|stored| stored.record).collect();
    let pages: Vec<Page> = paginate(records, config.page_size)
        .into_iter()
        .enumerate()
        .map(|(index, records)| Page { index, records })
        .collect();

    debug!(pages = pages.len(), "Query complete");
    Ok(pages)
}

/// Split items into consecutive chunks of `page_size`
///
/// The last chunk may be shorter. A `page_size` of zero or less yields a
/// single chunk holding everything. No items yields no chunks.
pub fn paginate<T>(items: Vec<T>, page_size: i64) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }

    let Ok(size) = usize::try_from(page_size) else {
        return vec![items];
    };
    if size == 0 {
        return vec![items];
    }

    let mut pages = Vec::with_capacity(items.len().div_ceil(size));
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        pages.push(items.by_ref().take(size).collect());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_sizes() {
        let pages = paginate((1..=5).collect(), 2);
        assert_eq!(pages, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn test_paginate_exact_multiple() {
        let pages = paginate((1..=4).collect(), 2);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_paginate_non_positive_size_is_single_page() {
        assert_eq!(paginate(vec![1, 2, 3], 0), vec![vec![1, 2, 3]]);
        assert_eq!(paginate(vec![1, 2, 3], -4), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_paginate_empty() {
        assert!(paginate(Vec::<u8>::new(), 3).is_empty());
        assert!(paginate(Vec::<u8>::new(), 0).is_empty());
    }
}
