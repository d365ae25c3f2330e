//! Producer - submits one fetch task per update period
//!
//! The producer never blocks on the task queue. When the worker is still
//! busy and the queue is full, the tick's task is dropped and the next tick
//! tries again.

use std::time::Duration;

use contracts::FetchFunction;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::endpoint::{ticker, Endpoint};
use crate::error::DispatcherError;
use crate::task::{SubmitOutcome, Task, TaskQueue};

/// Periodic task submitter for one channel
pub struct Producer {
    endpoint: Endpoint,
    period: Duration,
    fetch: FetchFunction,
    queue: Option<TaskQueue>,
}

impl Producer {
    pub fn new(
        name: impl Into<String>,
        period: Duration,
        fetch: FetchFunction,
        queue: TaskQueue,
    ) -> Self {
        Self {
            endpoint: Endpoint::new("producer", name),
            period,
            fetch,
            queue: Some(queue),
        }
    }

    pub fn name(&self) -> &str {
        self.endpoint.name()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.endpoint.is_running()
    }

    /// Start submitting; the first task goes out one period from now
    pub fn start(&mut self) -> Result<(), DispatcherError> {
        let queue = self
            .queue
            .take()
            .ok_or_else(|| self.endpoint.already_started())?;
        let name = self.endpoint.name().to_string();
        let period = self.period;
        let fetch = self.fetch.clone();

        self.endpoint
            .spawn(move |stop_rx| produce(name, period, fetch, queue, stop_rx))
    }

    /// Stop submitting. Returns once the producer task has exited and
    /// released its end of the task queue.
    pub async fn stop(&mut self) -> Result<(), DispatcherError> {
        self.endpoint.stop().await
    }
}

#[instrument(
    name = "producer_loop",
    skip(fetch, queue, stop_rx),
    fields(channel = %name)
)]
async fn produce(
    name: String,
    period: Duration,
    fetch: FetchFunction,
    queue: TaskQueue,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = ticker(period);
    let mut seq: u64 = 0;
    let mut closed_reported = false;

    debug!(channel = %name, period_ms = period.as_millis() as u64, "Producer started");

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                match queue.try_submit(Task::new(seq, fetch.clone())) {
                    SubmitOutcome::Accepted | SubmitOutcome::Dropped => {}
                    SubmitOutcome::Closed => {
                        if !closed_reported {
                            warn!(channel = %name, "Task queue closed, worker is gone");
                            closed_reported = true;
                        }
                    }
                }
                seq += 1;
            }
        }
    }

    debug!(channel = %name, ticks = seq, "Producer stopped");
}
