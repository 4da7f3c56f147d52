//! Filter configuration
//!
//! Caller-supplied, immutable description of one query: optional
//! timestamp bounds, field membership constraints, a result cap and a
//! page size. Field names are kept as strings here and resolved against
//! the registry when the query is built, so an unknown name surfaces as
//! an error from the query rather than from configuration decoding.

use chrono::{DateTime, Utc};

/// One `field IN values` constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    /// Storage key or canonical name of the field
    pub field: String,
    /// Accepted values
    pub values: Vec<String>,
}

impl FieldFilter {
    pub fn new<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Bounds, constraints and limits for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Inclusive lower bound on `created_at`
    pub logs_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub logs_before: Option<DateTime<Utc>>,
    /// Constraints, all of which must hold
    pub filters: Vec<FieldFilter>,
    /// Maximum number of records returned
    pub events_count: usize,
    /// Records per page; zero or negative means a single page
    pub page_size: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            logs_after: None,
            logs_before: None,
            filters: Vec::new(),
            events_count: 1000,
            page_size: 0,
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logs_after(mut self, after: DateTime<Utc>) -> Self {
        self.logs_after = Some(after);
        self
    }

    pub fn with_logs_before(mut self, before: DateTime<Utc>) -> Self {
        self.logs_before = Some(before);
        self
    }

    /// Add a `field IN values` constraint
    pub fn with_filter<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(FieldFilter::new(field, values));
        self
    }

    pub fn with_events_count(mut self, count: usize) -> Self {
        self.events_count = count;
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }
}
