//! Single-writer commit task
//!
//! Every submission is funneled through one mpsc channel into one task.
//! The task handles requests strictly one at a time: assign id and
//! timestamp, capture the field snapshot, append to the store, forward to
//! the system log sink, reply. One commit is fully visible before the next
//! begins, which gives a total order over writes.
//!
//! The task stops once every sender is gone and the queue is drained, so
//! submissions accepted before shutdown still complete.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use evlog_core::{Clock, EventDraft, EventRecord, FieldSnapshot, LogLevel, LogSink};
use evlog_storage::{RecordStore, StorageError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::WriteError;

/// A committed record in its canonical forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecord {
    pub record: EventRecord,
    /// Canonical JSON rendering, as stored
    pub payload: String,
    /// Message forwarded to the system log sink, `"<prefix>: <payload>"`
    pub message: String,
}

pub(crate) struct WriteRequest {
    pub draft: EventDraft,
    pub reply: oneshot::Sender<Result<RenderedRecord, WriteError>>,
}

pub(crate) struct Writer {
    store: Arc<dyn RecordStore>,
    fields: Arc<FieldSnapshot>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
    prefix: String,
    /// Timestamp of the latest commit, seeded from the store on start;
    /// new timestamps never go below it
    last_created_at: Option<DateTime<Utc>>,
    rx: mpsc::Receiver<WriteRequest>,
}

impl Writer {
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        fields: Arc<FieldSnapshot>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn LogSink>,
        prefix: String,
        last_created_at: Option<DateTime<Utc>>,
        rx: mpsc::Receiver<WriteRequest>,
    ) -> JoinHandle<()> {
        let writer = Self {
            store,
            fields,
            clock,
            sink,
            prefix,
            last_created_at,
            rx,
        };

        tokio::spawn(async move {
            writer.run().await;
        })
    }

    async fn run(mut self) {
        info!("Writer started");

        let mut committed = 0u64;
        while let Some(request) = self.rx.recv().await {
            let result = self.commit(request.draft).await;
            if result.is_ok() {
                committed += 1;
            }
            if request.reply.send(result).is_err() {
                debug!("Submitter went away before the commit finished");
            }
        }

        info!(committed, "Writer stopped");
    }

    async fn commit(&mut self, draft: EventDraft) -> Result<RenderedRecord, WriteError> {
        let event_name = draft.event_name.clone();
        let level = draft.level;

        let now = self.clock.now_utc();
        let created_at = match self.last_created_at {
            Some(last) if now < last => last,
            _ => now,
        };

        let record = EventRecord::assemble(
            draft,
            &self.fields.capture(),
            Uuid::new_v4().to_string(),
            created_at,
        );

        let store = Arc::clone(&self.store);
        let pending = record.clone();
        let outcome = tokio::task::spawn_blocking(move || store.append(&pending))
            .await
            .unwrap_or_else(|e| Err(StorageError::database(format!("commit task failed: {e}"))));

        match outcome {
            Ok(sequence) => {
                self.last_created_at = Some(created_at);
                debug!(log_id = %record.id(), sequence, event = %event_name, "Record committed");

                let payload = record.rendered_payload().to_string();
                let message = format!("{}: {}", self.prefix, payload);
                self.notify(level, &message);

                Ok(RenderedRecord {
                    record,
                    payload,
                    message,
                })
            }
            Err(e) => {
                error!(log_id = %record.id(), event = %event_name, error = %e, "Commit failed");
                self.notify(LogLevel::Fault, &format!("{event_name} failed to save"));
                Err(WriteError::Rejected(e))
            }
        }
    }

    fn notify(&self, level: LogLevel, message: &str) {
        if let Err(e) = self.sink.emit(level, message) {
            warn!(error = %e, %level, "System log sink failed");
        }
    }
}
