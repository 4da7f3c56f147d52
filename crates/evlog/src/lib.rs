//! # Evlog
//!
//! Embedded append-only event log for client applications.
//!
//! Callers submit named events with string properties and a level; the
//! logger attaches the current user and device context, assigns an id and
//! timestamp, commits the record through a single writer and mirrors it to
//! the system log. Committed records are read back with filtered,
//! newest-first, paginated queries.
//!
//! ## Example
//!
//! ```rust,ignore
//! use evlog::{EventLogger, LoggerConfig};
//! use evlog_core::{FilterConfig, LogLevel};
//!
//! let logger = EventLogger::open(LoggerConfig::with_db_path("./data/app.redb")).await?;
//! logger.set_user("u-42", "Ada", None);
//!
//! let rendered = logger
//!     .submit("checkout", [("items", 3)], LogLevel::Info)
//!     .await?;
//! println!("{}", rendered.message);
//!
//! let pages = logger.query(
//!     &FilterConfig::new()
//!         .with_filter("log_level", ["error", "fault"])
//!         .with_page_size(50),
//! )?;
//!
//! logger.shutdown().await;
//! ```

pub mod config;
pub mod error;
pub mod logger;
mod refresh;
mod writer;

// Re-exports
pub use config::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_REFRESH_INTERVAL, DEFAULT_SINK_PREFIX, LoggerConfig,
    StorageConfig,
};
pub use error::{LoggerError, LoggerResult, WriteError};
pub use logger::{EventLogger, EventLoggerBuilder, PendingWrite};
pub use writer::RenderedRecord;

pub use evlog_core::{FilterConfig, LogLevel, LogsConfig, PropertyValue};
pub use evlog_storage::{Page, RedbStoreConfig};
