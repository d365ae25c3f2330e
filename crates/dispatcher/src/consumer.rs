//! Consumer - drains results and drives the render callback
//!
//! Each drain period the consumer takes everything waiting in the result
//! queue and keeps only the newest entry. Non-empty content is rendered and
//! clears the staleness flag; empty content sets it. A drain that finds
//! nothing leaves the flag untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::RenderFunction;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

use crate::endpoint::{ticker, Endpoint};
use crate::error::DispatcherError;
use crate::metrics::ChannelMetrics;
use crate::task::{Drained, ResultQueue};

/// Shared staleness flag. Starts out stale.
#[derive(Debug, Clone)]
pub struct SignalFlag(Arc<AtomicBool>);

impl SignalFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// No fresh content has been rendered
    pub fn is_no_signal(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_stale(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn mark_live(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for SignalFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer settings
#[derive(Debug, Clone, Copy)]
pub struct ConsumerConfig {
    /// How often the result queue is drained
    pub drain_period: Duration,
    /// Mark the channel stale when nothing renderable arrives within this
    pub signal_timeout: Option<Duration>,
}

/// Periodic result drainer for one channel
pub struct Consumer {
    endpoint: Endpoint,
    config: ConsumerConfig,
    render: RenderFunction,
    queue: Option<ResultQueue>,
    signal: SignalFlag,
    metrics: Arc<ChannelMetrics>,
}

impl Consumer {
    pub fn new(
        name: impl Into<String>,
        config: ConsumerConfig,
        render: RenderFunction,
        queue: ResultQueue,
        metrics: Arc<ChannelMetrics>,
    ) -> Self {
        Self {
            endpoint: Endpoint::new("consumer", name),
            config,
            render,
            queue: Some(queue),
            signal: SignalFlag::new(),
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        self.endpoint.name()
    }

    pub fn drain_period(&self) -> Duration {
        self.config.drain_period
    }

    /// Handle to the staleness flag
    pub fn signal(&self) -> SignalFlag {
        self.signal.clone()
    }

    pub fn no_signal(&self) -> bool {
        self.signal.is_no_signal()
    }

    pub fn is_running(&self) -> bool {
        self.endpoint.is_running()
    }

    /// Start draining; the first drain happens one period from now
    pub fn start(&mut self) -> Result<(), DispatcherError> {
        let queue = self
            .queue
            .take()
            .ok_or_else(|| self.endpoint.already_started())?;
        let drain = Drain {
            name: self.endpoint.name().to_string(),
            config: self.config,
            render: self.render.clone(),
            signal: self.signal.clone(),
            metrics: self.metrics.clone(),
        };

        self.endpoint.spawn(move |stop_rx| drain.run(queue, stop_rx))
    }

    /// Stop draining. No render happens after this returns.
    pub async fn stop(&mut self) -> Result<(), DispatcherError> {
        self.endpoint.stop().await
    }
}

/// State moved into the consumer task
struct Drain {
    name: String,
    config: ConsumerConfig,
    render: RenderFunction,
    signal: SignalFlag,
    metrics: Arc<ChannelMetrics>,
}

impl Drain {
    #[instrument(name = "consumer_loop", skip_all, fields(channel = %self.name))]
    async fn run(self, mut queue: ResultQueue, mut stop_rx: oneshot::Receiver<()>) {
        let mut ticker = ticker(self.config.drain_period);
        let mut last_live = Instant::now();
        let mut closed_reported = false;

        debug!(
            channel = %self.name,
            drain_ms = self.config.drain_period.as_millis() as u64,
            "Consumer started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    match queue.drain_latest() {
                        Drained::Nothing => {}
                        Drained::Latest { content, skipped } => {
                            if skipped > 0 {
                                trace!(channel = %self.name, skipped, "Older results superseded");
                            }
                            if content.is_empty() {
                                trace!(channel = %self.name, "Empty result, no signal");
                                self.signal.mark_stale();
                            } else {
                                // Live before render, so a placeholder drawn
                                // after the flag check is always overwritten
                                self.signal.mark_live();
                                (self.render)(&content);
                                self.metrics.inc_delivered();
                                observability::record_result_delivered(&self.name);
                                last_live = Instant::now();
                            }
                        }
                        Drained::Closed => {
                            self.signal.mark_stale();
                            if !closed_reported {
                                warn!(channel = %self.name, "Result queue closed, channel has no signal");
                                closed_reported = true;
                            }
                        }
                    }

                    if let Some(timeout) = self.config.signal_timeout {
                        if !self.signal.is_no_signal() && last_live.elapsed() >= timeout {
                            debug!(channel = %self.name, "Signal timed out");
                            self.signal.mark_stale();
                        }
                    }
                }
            }
        }

        debug!(channel = %self.name, "Consumer stopped");
    }
}
