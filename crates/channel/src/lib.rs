//! # Channel
//!
//! One data source, end to end: an isolated executor, a producer submitting
//! fetch tasks every update period and a consumer rendering the newest
//! result. The main loop only ever talks to this type.
//!
//! # Example
//!
//! ```ignore
//! let mut channel = Channel::new("uptime", fetch, render, Duration::from_secs(5))?;
//! channel.turn_on()?;
//! // ... main loop ...
//! if channel.no_signal() {
//!     channel.display_static();
//! }
//! channel.turn_off().await?;
//! ```

mod error;

pub use error::ChannelError;

use std::sync::Arc;
use std::time::Duration;

use contracts::{ChannelConfig, FetchFunction, RenderFunction, MIN_DRAIN_PERIOD};
use dispatcher::{
    ChannelMetrics, Consumer, ConsumerConfig, Executor, ExecutorConfig, MetricsSnapshot, Producer,
    SignalFlag, WorkerState,
};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Placeholder drawer invoked while a channel has no signal
///
/// The argument re-reads the no-signal state. A drawer that shares a lock
/// with the render target must check it under that lock before drawing.
pub type StaticHook = Arc<dyn Fn(&dyn Fn() -> bool) + Send + Sync>;

/// What the main loop should show for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelHealth {
    /// Fresh content has been rendered
    Live,
    /// Nothing usable from the latest drain
    NoSignal,
    /// The worker died; stale until the channel is rebuilt
    WorkerFailed,
}

impl ChannelHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelHealth::Live => "live",
            ChannelHealth::NoSignal => "no signal",
            ChannelHealth::WorkerFailed => "worker failed",
        }
    }
}

impl std::fmt::Display for ChannelHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Ready,
    On,
    Off,
}

/// Timing and queue settings for one channel
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub update_period: Duration,
    pub drain_period: Duration,
    pub task_queue_capacity: usize,
    pub result_queue_capacity: usize,
    pub stop_grace: Duration,
    pub signal_timeout: Option<Duration>,
}

impl ChannelSettings {
    /// Defaults derived from the update period; drains four times per update
    pub fn with_update_period(update_period: Duration) -> Self {
        Self {
            update_period,
            drain_period: (update_period / 4).max(MIN_DRAIN_PERIOD),
            task_queue_capacity: 1,
            result_queue_capacity: 4,
            stop_grace: Duration::from_secs(2),
            signal_timeout: None,
        }
    }
}

impl From<&ChannelConfig> for ChannelSettings {
    fn from(config: &ChannelConfig) -> Self {
        Self {
            update_period: config.update_period(),
            drain_period: config.drain_period(),
            task_queue_capacity: config.task_queue_capacity,
            result_queue_capacity: config.result_queue_capacity,
            stop_grace: config.stop_grace(),
            signal_timeout: config.signal_timeout(),
        }
    }
}

/// Executor + Producer + Consumer for a single data source
pub struct Channel {
    name: String,
    executor: Executor,
    producer: Producer,
    consumer: Consumer,
    signal: SignalFlag,
    worker_state: watch::Receiver<WorkerState>,
    metrics: Arc<ChannelMetrics>,
    static_hook: Option<StaticHook>,
    state: ChannelState,
}

impl Channel {
    /// Channel with default settings for the given update period
    pub fn new(
        name: impl Into<String>,
        fetch: FetchFunction,
        render: RenderFunction,
        update_period: Duration,
    ) -> Result<Self, ChannelError> {
        Self::with_settings(
            name,
            fetch,
            render,
            ChannelSettings::with_update_period(update_period),
        )
    }

    /// Channel configured from a blueprint entry
    pub fn from_config(
        config: &ChannelConfig,
        fetch: FetchFunction,
        render: RenderFunction,
    ) -> Result<Self, ChannelError> {
        Self::with_settings(&config.name, fetch, render, ChannelSettings::from(config))
    }

    pub fn with_settings(
        name: impl Into<String>,
        fetch: FetchFunction,
        render: RenderFunction,
        settings: ChannelSettings,
    ) -> Result<Self, ChannelError> {
        let name = name.into();
        let metrics = Arc::new(ChannelMetrics::new());

        let mut executor = Executor::new(
            name.clone(),
            ExecutorConfig {
                task_queue_capacity: settings.task_queue_capacity,
                result_queue_capacity: settings.result_queue_capacity,
                grace_period: settings.stop_grace,
            },
            metrics.clone(),
        );
        let task_queue = executor.take_task_queue()?;
        let result_queue = executor.take_result_queue()?;

        let producer = Producer::new(name.clone(), settings.update_period, fetch, task_queue);
        let consumer = Consumer::new(
            name.clone(),
            ConsumerConfig {
                drain_period: settings.drain_period,
                signal_timeout: settings.signal_timeout,
            },
            render,
            result_queue,
            metrics.clone(),
        );

        Ok(Self {
            signal: consumer.signal(),
            worker_state: executor.subscribe(),
            name,
            executor,
            producer,
            consumer,
            metrics,
            static_hook: None,
            state: ChannelState::Ready,
        })
    }

    /// Attach the placeholder drawer used by `display_static`
    pub fn with_static_hook(mut self, hook: StaticHook) -> Self {
        self.static_hook = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Start executor, producer, consumer in that order
    #[instrument(name = "channel_turn_on", skip(self), fields(channel = %self.name))]
    pub fn turn_on(&mut self) -> Result<(), ChannelError> {
        match self.state {
            ChannelState::On => {
                return Err(ChannelError::AlreadyOn {
                    name: self.name.clone(),
                })
            }
            ChannelState::Off => {
                return Err(ChannelError::Retired {
                    name: self.name.clone(),
                })
            }
            ChannelState::Ready => {}
        }

        self.executor.start()?;
        self.state = ChannelState::On;
        self.producer.start()?;
        self.consumer.start()?;

        info!(
            channel = %self.name,
            update_ms = self.producer.period().as_millis() as u64,
            drain_ms = self.consumer.drain_period().as_millis() as u64,
            "Channel turned on"
        );
        Ok(())
    }

    /// Stop consumer, producer, executor in that order
    ///
    /// Safe to call more than once; later calls only log. Returns the final
    /// worker state.
    #[instrument(name = "channel_turn_off", skip(self), fields(channel = %self.name))]
    pub async fn turn_off(&mut self) -> Result<WorkerState, ChannelError> {
        match self.state {
            ChannelState::Off => {
                warn!(channel = %self.name, "Channel already turned off");
                return Ok(self.executor.state());
            }
            ChannelState::Ready => {
                self.state = ChannelState::Off;
                return Ok(self.executor.state());
            }
            ChannelState::On => {}
        }
        self.state = ChannelState::Off;

        // All three are attempted; the first failure is reported
        let consumer = self.consumer.stop().await;
        let producer = self.producer.stop().await;
        let executor = self.executor.stop().await;
        consumer?;
        producer?;
        let worker = executor?;

        info!(channel = %self.name, worker = ?worker, "Channel turned off");
        Ok(worker)
    }

    /// Whether the main loop should show the placeholder
    pub fn no_signal(&self) -> bool {
        self.signal.is_no_signal() || self.worker_failed()
    }

    pub fn health(&self) -> ChannelHealth {
        if self.worker_failed() {
            ChannelHealth::WorkerFailed
        } else if self.signal.is_no_signal() {
            ChannelHealth::NoSignal
        } else {
            ChannelHealth::Live
        }
    }

    /// Draw the placeholder if the channel has no signal
    ///
    /// Returns whether the channel had no signal.
    pub fn display_static(&self) -> bool {
        if !self.no_signal() {
            return false;
        }
        if let Some(hook) = &self.static_hook {
            hook(&|| self.no_signal());
        }
        true
    }

    pub fn worker_state(&self) -> WorkerState {
        self.executor.state()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn worker_failed(&self) -> bool {
        *self.worker_state.borrow() == WorkerState::Failed
    }
}
