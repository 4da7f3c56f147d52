//! Logging setup for evlog
//!
//! Two concerns live here:
//!
//! - **Subscriber setup**: JSONL or pretty console output, optional JSONL
//!   files with rotation, `RUST_LOG` overrides via `EnvFilter`
//! - **System log sink**: [`TracingSink`], the default [`LogSink`] that
//!   mirrors every committed record onto the `evlog::events` target
//!
//! # Quick Start
//!
//! ```ignore
//! use evlog_logging::{EvlogSubscriberBuilder, LogConfig};
//!
//! // JSONL to console
//! EvlogSubscriberBuilder::new().init()?;
//!
//! // Pretty output while developing
//! EvlogSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init()?;
//! ```
//!
//! [`LogSink`]: evlog_core::LogSink

pub mod config;
pub mod sink;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use sink::{EVENTS_TARGET, TracingSink};

use std::fs::{self, OpenOptions};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A level or target directive could not be parsed
    #[error("Invalid filter directive: {0}")]
    Directive(String),

    /// The log file or directory could not be created
    #[error("Log file error: {0}")]
    File(#[from] std::io::Error),

    /// A global subscriber is already installed
    #[error("Subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Builder for configuring and initializing the evlog tracing subscriber
///
/// Console output is JSONL unless `console.pretty` is set.
pub struct EvlogSubscriberBuilder {
    config: LogConfig,
}

impl EvlogSubscriberBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Install the subscriber globally
    ///
    /// The returned guard flushes the file writer when dropped and must be
    /// held for the life of the program when file output is enabled.
    pub fn init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let filter = self.env_filter()?;
        let (layers, guard) = self.layers()?;

        Registry::default()
            .with(layers)
            .with(filter)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

        Ok(guard)
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        let mut filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.config.default_level))
            .map_err(|e| LoggingError::Directive(e.to_string()))?;

        for (target, level) in &self.config.targets {
            let directive = format!("{target}={level}")
                .parse::<Directive>()
                .map_err(|e| LoggingError::Directive(format!("{target}={level}: {e}")))?;
            filter = filter.add_directive(directive);
        }

        Ok(filter)
    }

    fn layers(&self) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>), LoggingError> {
        let jsonl = &self.config.jsonl;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        match (self.config.console.enabled, self.config.console.pretty) {
            (true, true) => layers.push(
                tracing_subscriber::fmt::layer()
                    .with_ansi(self.config.console.ansi)
                    .with_target(true)
                    .boxed(),
            ),
            (true, false) => layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .boxed(),
            ),
            (false, _) => {}
        }

        let mut guard = None;
        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = file_writer(file_config)?;
            guard = Some(file_guard);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .with_writer(writer)
                    .boxed(),
            );
        }

        Ok((layers, guard))
    }
}

impl Default for EvlogSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;

    let rotation = match config.rotation {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            return Ok(tracing_appender::non_blocking(file));
        }
    };

    let appender = RollingFileAppender::new(rotation, &config.directory, &config.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging with default settings (JSONL to console)
pub fn init_default() -> Result<(), LoggingError> {
    EvlogSubscriberBuilder::new().init().map(|_| ())
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() -> Result<(), LoggingError> {
    EvlogSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init()
        .map(|_| ())
}

/// Initialize logging for tests
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_testing() {
    let _ = EvlogSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .init();
}
