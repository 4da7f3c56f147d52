//! System log sink backed by `tracing`

use evlog_core::{LogLevel, LogSink, SinkError};
use tracing::{debug, error, info};

/// Target every mirrored record is emitted under
pub const EVENTS_TARGET: &str = "evlog::events";

/// Mirrors committed records onto the tracing subscriber
///
/// Level mapping: `default` and `info` become INFO, `debug` becomes DEBUG,
/// `error` becomes ERROR and `fault` becomes ERROR with `fault = true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn emit(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        match level {
            LogLevel::Default | LogLevel::Info => {
                info!(target: EVENTS_TARGET, log_level = %level, "{message}")
            }
            LogLevel::Debug => debug!(target: EVENTS_TARGET, log_level = %level, "{message}"),
            LogLevel::Error => error!(target: EVENTS_TARGET, log_level = %level, "{message}"),
            LogLevel::Fault => {
                error!(target: EVENTS_TARGET, log_level = %level, fault = true, "{message}")
            }
        }
        Ok(())
    }
}
