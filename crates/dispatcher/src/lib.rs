//! # Dispatcher
//!
//! Per-channel fetch pipeline.
//!
//! Responsibilities:
//! - Run blocking fetch tasks on an isolated worker thread (`Executor`)
//! - Submit one task per update period without ever blocking (`Producer`)
//! - Drain results, render the newest, track staleness (`Consumer`)

mod endpoint;
pub mod consumer;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod producer;
pub mod task;

pub use consumer::{Consumer, ConsumerConfig, SignalFlag};
pub use error::DispatcherError;
pub use executor::{Executor, ExecutorConfig, WorkerState};
pub use metrics::{ChannelMetrics, MetricsSnapshot};
pub use producer::Producer;
pub use task::{Drained, ResultQueue, SubmitOutcome, Task, TaskQueue};
