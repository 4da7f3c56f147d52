//! Collaborator traits
//!
//! The store talks to the outside world through three narrow seams: a
//! clock, a context provider for device attributes, and the system-level
//! logging sink. Each has a real implementation and a deterministic one
//! for tests.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use thiserror::Error;

use crate::level::LogLevel;

/// Time source used to stamp records
pub trait Clock: Send + Sync {
    /// Get the current UTC datetime
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real clock implementation using system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Supplies device attributes from the host platform
///
/// Polled periodically. `None` means the value is unavailable and is
/// stored as the `"nil"` sentinel.
pub trait ContextProvider: Send + Sync {
    fn current_model(&self) -> Option<String>;
    fn current_os_version(&self) -> Option<String>;
    fn current_os_name(&self) -> Option<String>;
    fn current_time_zone_id(&self) -> Option<String>;
    /// `"<short version>.<build>"`
    fn current_app_version(&self) -> Option<String>;
}

/// Context provider with fixed values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticContext {
    pub model: Option<String>,
    pub os_version: Option<String>,
    pub os_name: Option<String>,
    pub time_zone: Option<String>,
    pub app_version: Option<String>,
}

impl StaticContext {
    /// Values that can be read from the running process
    ///
    /// The time zone comes from `TZ` when set, otherwise the current UTC
    /// offset (e.g. `+02:00`).
    pub fn host() -> Self {
        let time_zone = std::env::var("TZ")
            .ok()
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| chrono::Local::now().offset().to_string());

        Self {
            model: Some(std::env::consts::ARCH.to_string()),
            os_version: None,
            os_name: Some(std::env::consts::OS.to_string()),
            time_zone: Some(time_zone),
            app_version: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
        self.os_version = Some(version.into());
        self
    }

    pub fn with_os_name(mut self, name: impl Into<String>) -> Self {
        self.os_name = Some(name.into());
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    /// Set the app version from its short version and build number
    pub fn with_app_version(mut self, version: &str, build: &str) -> Self {
        self.app_version = Some(format!("{version}.{build}"));
        self
    }
}

impl ContextProvider for StaticContext {
    fn current_model(&self) -> Option<String> {
        self.model.clone()
    }

    fn current_os_version(&self) -> Option<String> {
        self.os_version.clone()
    }

    fn current_os_name(&self) -> Option<String> {
        self.os_name.clone()
    }

    fn current_time_zone_id(&self) -> Option<String> {
        self.time_zone.clone()
    }

    fn current_app_version(&self) -> Option<String> {
        self.app_version.clone()
    }
}

/// Failure reported by a [`LogSink`]
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// System-level logging facility that receives rendered records
///
/// Emission is fire-and-forget from the store's point of view: errors are
/// observed and logged, never turned into write failures.
pub trait LogSink: Send + Sync {
    fn emit(&self, level: LogLevel, message: &str) -> Result<(), SinkError>;
}

/// Sink that keeps every emitted message in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages emitted so far, in emission order
    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        self.messages.lock().push((level, message.to_string()));
        Ok(())
    }
}
