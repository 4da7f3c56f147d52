//! Error types for the event logger

use evlog_core::CoreError;
use evlog_storage::{QueryError, StorageError};
use thiserror::Error;

/// A submission that did not produce a committed record
#[derive(Debug, Error)]
pub enum WriteError {
    /// The store refused the commit; nothing was stored
    #[error("Commit rejected: {0}")]
    Rejected(#[source] StorageError),

    /// The submission was malformed and never reached the store
    #[error("Invalid event: {0}")]
    InvalidEvent(#[source] CoreError),

    /// The write queue is at capacity
    #[error("Write queue full")]
    QueueFull,

    /// The logger has shut down
    #[error("Writer closed")]
    WriterClosed,
}

/// Errors that can occur in logger operations
#[derive(Debug, Error)]
pub enum LoggerError {
    /// A filter references a field outside the registry
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Submission failure
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// Background task error
    #[error("Task error: {0}")]
    Task(String),
}

impl From<QueryError> for LoggerError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownField(name) => LoggerError::UnknownField(name),
            QueryError::Storage(e) => LoggerError::Storage(e),
        }
    }
}

impl From<tokio::task::JoinError> for LoggerError {
    fn from(err: tokio::task::JoinError) -> Self {
        LoggerError::Task(err.to_string())
    }
}

/// Result type alias for logger operations
pub type LoggerResult<T> = Result<T, LoggerError>;
