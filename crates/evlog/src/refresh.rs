//! Periodic device context refresh

use std::sync::Arc;
use std::time::Duration;

use evlog_core::{ContextProvider, FieldSnapshot};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{info, trace};

/// Background task polling the context provider into the field snapshot
pub(crate) struct ContextRefresher {
    fields: Arc<FieldSnapshot>,
    context: Arc<dyn ContextProvider>,
    period: Duration,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ContextRefresher {
    pub fn spawn(
        fields: Arc<FieldSnapshot>,
        context: Arc<dyn ContextProvider>,
        period: Duration,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let task = Self {
            fields,
            context,
            period,
            shutdown_rx,
        };

        tokio::spawn(async move {
            task.run().await;
        })
    }

    async fn run(mut self) {
        info!(period_secs = self.period.as_secs(), "Context refresh started");

        // First tick one period out; the logger refreshes once at startup
        let mut ticker = interval_at(Instant::now() + self.period, self.period);

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("Context refresh shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.fields.refresh_from(self.context.as_ref());
                    trace!("Device context refreshed");
                }
            }
        }
    }
}
