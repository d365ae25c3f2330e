//! Periodic endpoint plumbing shared by the producer and the consumer
//!
//! An endpoint is a tokio task that wakes once per period until it is told to
//! stop. Stopping wakes it immediately rather than at the next tick.

use std::future::Future;
use std::time::Duration;

use contracts::MIN_PERIOD;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error};

use crate::error::DispatcherError;

/// Ticker whose first tick is one full period after start
///
/// Periods shorter than `MIN_PERIOD` are raised to it.
pub(crate) fn ticker(period: Duration) -> Interval {
    let period = period.max(MIN_PERIOD);
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

struct Running {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Start/stop bookkeeping for one periodic task
pub(crate) struct Endpoint {
    component: &'static str,
    name: String,
    started: bool,
    running: Option<Running>,
}

impl Endpoint {
    pub(crate) fn new(component: &'static str, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
            started: false,
            running: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    pub(crate) fn already_started(&self) -> DispatcherError {
        DispatcherError::already_started(self.component, &self.name)
    }

    /// Spawn the endpoint body; it must return once the stop receiver fires
    pub(crate) fn spawn<F, Fut>(&mut self, body: F) -> Result<(), DispatcherError>
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.started {
            return Err(self.already_started());
        }
        self.started = true;

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(body(stop_rx));
        self.running = Some(Running { stop_tx, handle });
        debug!(component = self.component, channel = %self.name, "Endpoint started");
        Ok(())
    }

    /// Signal the endpoint and wait for its task to finish
    pub(crate) async fn stop(&mut self) -> Result<(), DispatcherError> {
        let Running { stop_tx, handle } = self
            .running
            .take()
            .ok_or_else(|| DispatcherError::not_running(self.component, &self.name))?;

        // The task may already have exited on its own
        let _ = stop_tx.send(());
        if let Err(e) = handle.await {
            error!(
                component = self.component,
                channel = %self.name,
                error = ?e,
                "Endpoint task panicked"
            );
        }
        debug!(component = self.component, channel = %self.name, "Endpoint stopped");
        Ok(())
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}
