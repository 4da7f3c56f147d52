//! The event logger
//!
//! Owns the record store, the field snapshot, the writer task and the
//! context refresh task. Writes go through the writer; reads go straight
//! to the store, which serves each read from a committed snapshot.

use std::sync::Arc;

use evlog_core::{
    Clock, ContextProvider, EventDraft, EventRecord, FieldSnapshot, FilterConfig, LogLevel,
    LogSink, PropertyValue, StaticContext, SystemClock, coerce_properties,
};
use evlog_logging::TracingSink;
use evlog_storage::{InMemoryRecordStore, Page, RecordStore, RedbRecordStore};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::config::{LoggerConfig, StorageConfig};
use crate::error::{LoggerError, LoggerResult, WriteError};
use crate::refresh::ContextRefresher;
use crate::writer::{RenderedRecord, WriteRequest, Writer};

/// Completion handle for a submission accepted by [`EventLogger::enqueue`]
#[derive(Debug)]
pub struct PendingWrite {
    reply: oneshot::Receiver<Result<RenderedRecord, WriteError>>,
}

impl PendingWrite {
    /// Wait for the writer to commit or reject the submission
    pub async fn wait(self) -> Result<RenderedRecord, WriteError> {
        self.reply.await.map_err(|_| WriteError::WriterClosed)?
    }
}

/// Builder for an [`EventLogger`]
///
/// Anything not supplied falls back to the real implementation: the
/// system clock, host context, the tracing sink and the store described
/// by the configuration.
pub struct EventLoggerBuilder {
    config: LoggerConfig,
    clock: Option<Arc<dyn Clock>>,
    context: Option<Arc<dyn ContextProvider>>,
    sink: Option<Arc<dyn LogSink>>,
    store: Option<Arc<dyn RecordStore>>,
}

impl EventLoggerBuilder {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            clock: None,
            context: None,
            sink: None,
            store: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_context(mut self, context: Arc<dyn ContextProvider>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Use an existing store instead of the configured backend
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Open the store and start the background tasks
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip_all)]
    pub async fn build(self) -> LoggerResult<EventLogger> {
        let store = match self.store {
            Some(store) => store,
            None => open_store(&self.config.storage).await?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let context = self
            .context
            .unwrap_or_else(|| Arc::new(StaticContext::host()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink::new()));

        let fields = Arc::new(FieldSnapshot::new());
        fields.refresh_from(context.as_ref());

        let latest = {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || store.latest_created_at()).await??
        };

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (shutdown_tx, _) = broadcast::channel(1);

        let mut tasks = vec![Writer::spawn(
            Arc::clone(&store),
            Arc::clone(&fields),
            clock,
            sink,
            self.config.sink_prefix.clone(),
            latest,
            rx,
        )];

        if let Some(period) = self.config.refresh_interval.filter(|p| !p.is_zero()) {
            tasks.push(ContextRefresher::spawn(
                Arc::clone(&fields),
                Arc::clone(&context),
                period,
                shutdown_tx.subscribe(),
            ));
        }

        info!(records = store.count()?, "Event logger started");

        Ok(EventLogger {
            config: self.config,
            store,
            fields,
            context,
            tx: RwLock::new(Some(tx)),
            shutdown_tx,
            tasks: Mutex::new(tasks),
        })
    }
}

async fn open_store(config: &StorageConfig) -> LoggerResult<Arc<dyn RecordStore>> {
    match config {
        StorageConfig::InMemory => Ok(Arc::new(InMemoryRecordStore::new())),
        StorageConfig::Redb(redb) => {
            let redb = redb.clone();
            let store = tokio::task::spawn_blocking(move || RedbRecordStore::open(redb)).await??;
            Ok(Arc::new(store))
        }
    }
}

/// Embedded append-only event log
///
/// Submissions from any number of tasks are committed one at a time by a
/// single writer. Field setters update the snapshot the writer copies into
/// each record; a setter racing a submission may or may not be reflected
/// in that record.
pub struct EventLogger {
    config: LoggerConfig,
    store: Arc<dyn RecordStore>,
    fields: Arc<FieldSnapshot>,
    context: Arc<dyn ContextProvider>,
    /// `None` once shut down
    tx: RwLock<Option<mpsc::Sender<WriteRequest>>>,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EventLogger {
    /// Start a logger with default collaborators
    pub async fn open(config: LoggerConfig) -> LoggerResult<Self> {
        EventLoggerBuilder::new(config).build().await
    }

    pub fn builder(config: LoggerConfig) -> EventLoggerBuilder {
        EventLoggerBuilder::new(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    // ---- Write path ----

    /// Submit an event and wait for it to be committed
    ///
    /// Property values are coerced to strings: strings pass through,
    /// numbers use their decimal form, booleans become `"true"`/`"false"`
    /// and anything else becomes `"nil"`.
    pub async fn submit<I, K, V>(
        &self,
        event_name: impl Into<String>,
        properties: I,
        level: LogLevel,
    ) -> Result<RenderedRecord, WriteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let draft = EventDraft::new(event_name, level, coerce_properties(properties))
            .map_err(WriteError::InvalidEvent)?;

        let (reply, rx) = oneshot::channel();
        let tx = self.sender()?;
        tx.send(WriteRequest { draft, reply })
            .await
            .map_err(|_| WriteError::WriterClosed)?;

        PendingWrite { reply: rx }.wait().await
    }

    /// Submit an event without properties
    pub async fn log(
        &self,
        event_name: impl Into<String>,
        level: LogLevel,
    ) -> Result<RenderedRecord, WriteError> {
        self.submit(event_name, std::iter::empty::<(String, String)>(), level)
            .await
    }

    /// Queue an event without waiting
    ///
    /// Returns as soon as the submission is queued. Fails with
    /// [`WriteError::QueueFull`] instead of waiting for room.
    pub fn enqueue<I, K, V>(
        &self,
        event_name: impl Into<String>,
        properties: I,
        level: LogLevel,
    ) -> Result<PendingWrite, WriteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let draft = EventDraft::new(event_name, level, coerce_properties(properties))
            .map_err(WriteError::InvalidEvent)?;

        let (reply, rx) = oneshot::channel();
        self.sender()?
            .try_send(WriteRequest { draft, reply })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => WriteError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => WriteError::WriterClosed,
            })?;

        Ok(PendingWrite { reply: rx })
    }

    fn sender(&self) -> Result<mpsc::Sender<WriteRequest>, WriteError> {
        self.tx.read().clone().ok_or(WriteError::WriterClosed)
    }

    // ---- Field snapshot ----

    /// Attribute later records to a user; `None` clears the email
    pub fn set_user(&self, id: impl Into<String>, name: impl Into<String>, email: Option<String>) {
        self.fields.set_user(id, name, email);
    }

    pub fn set_device_id(&self, device_id: impl Into<String>) {
        self.fields.set_device_id(device_id);
    }

    /// Set the location; `None` resets a coordinate to the sentinel
    pub fn set_location(&self, latitude: Option<f64>, longitude: Option<f64>) {
        self.fields.set_location(latitude, longitude);
    }

    /// Poll the context provider now instead of waiting for the next refresh
    pub fn refresh_context(&self) {
        self.fields.refresh_from(self.context.as_ref());
    }

    // ---- Reads ----

    /// Run a query against committed records
    pub fn query(&self, config: &FilterConfig) -> LoggerResult<Vec<Page>> {
        Ok(evlog_storage::query(self.store.as_ref(), config)?)
    }

    /// Run a query on the blocking pool
    pub async fn query_async(&self, config: FilterConfig) -> LoggerResult<Vec<Page>> {
        let store = Arc::clone(&self.store);
        let pages = tokio::task::spawn_blocking(move || evlog_storage::query(store.as_ref(), &config)).await??;
        Ok(pages)
    }

    /// Run the query described by the configured logs document
    pub fn fetch(&self) -> LoggerResult<Vec<Page>> {
        self.query(&self.config.logs.filter_config())
    }

    pub async fn fetch_async(&self) -> LoggerResult<Vec<Page>> {
        self.query_async(self.config.logs.filter_config()).await
    }

    /// Look up a committed record by id
    pub fn get(&self, log_id: &str) -> LoggerResult<Option<EventRecord>> {
        Ok(self.store.get(log_id)?)
    }

    /// Number of committed records
    pub fn count(&self) -> LoggerResult<usize> {
        Ok(self.store.count()?)
    }

    // ---- Lifecycle ----

    /// Stop accepting submissions and wait for queued ones to finish
    ///
    /// Later submissions fail with [`WriteError::WriterClosed`].
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        if self.tx.write().take().is_none() {
            return;
        }

        let _ = self.shutdown_tx.send(());

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                debug!(error = %e, "Background task ended abnormally");
            }
        }

        info!("Event logger stopped");
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        // The writer stops on its own once the sender is dropped
        let _ = self.shutdown_tx.send(());
    }
}
