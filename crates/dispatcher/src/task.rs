//! Task and result queues
//!
//! The task queue is a bounded FIFO from the producer to the worker. The
//! producer never waits on it: a full queue drops the task. The result queue
//! carries content back from the worker to the consumer, which only ever
//! looks at the most recent entry.

use std::fmt;
use std::sync::Arc;

use contracts::{Content, FetchFunction};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tracing::trace;

use crate::metrics::ChannelMetrics;

/// A unit of work: invoke the channel's fetch function once
#[derive(Clone)]
pub struct Task {
    seq: u64,
    fetch: FetchFunction,
}

impl Task {
    pub fn new(seq: u64, fetch: FetchFunction) -> Self {
        Self { seq, fetch }
    }

    /// Producer-assigned sequence number
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Run the fetch function, consuming the task
    pub fn invoke(self) -> Content {
        (self.fetch)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// Messages carried by the task queue
#[derive(Debug)]
pub(crate) enum Envelope {
    Run(Task),
    Stop,
}

/// Result of a non-blocking submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Task is queued
    Accepted,
    /// Queue full, task discarded
    Dropped,
    /// Worker side is gone
    Closed,
}

/// Producer-side handle of the task queue
#[derive(Debug)]
pub struct TaskQueue {
    channel: String,
    tx: mpsc::Sender<Envelope>,
    metrics: Arc<ChannelMetrics>,
}

impl TaskQueue {
    pub(crate) fn new(
        channel: impl Into<String>,
        tx: mpsc::Sender<Envelope>,
        metrics: Arc<ChannelMetrics>,
    ) -> Self {
        Self {
            channel: channel.into(),
            tx,
            metrics,
        }
    }

    /// Submit without waiting. A full queue drops the task.
    pub fn try_submit(&self, task: Task) -> SubmitOutcome {
        let seq = task.seq();
        match self.tx.try_send(Envelope::Run(task)) {
            Ok(()) => {
                self.metrics.inc_submitted();
                observability::record_task_submitted(&self.channel);
                trace!(channel = %self.channel, seq, "task queued");
                SubmitOutcome::Accepted
            }
            Err(TrySendError::Full(_)) => {
                self.metrics.inc_dropped();
                observability::record_task_dropped(&self.channel);
                trace!(channel = %self.channel, seq, "task queue full, task dropped");
                SubmitOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => SubmitOutcome::Closed,
        }
    }

    /// Maximum number of queued tasks
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Whether the worker side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Outcome of draining the result queue
#[derive(Debug)]
pub enum Drained {
    /// Nothing new since the last drain
    Nothing,
    /// Most recent result; `skipped` older ones were discarded
    Latest { content: Content, skipped: usize },
    /// Worker side is gone and the queue is empty
    Closed,
}

/// Consumer-side handle of the result queue
#[derive(Debug)]
pub struct ResultQueue {
    rx: mpsc::Receiver<Content>,
}

impl ResultQueue {
    pub(crate) fn new(rx: mpsc::Receiver<Content>) -> Self {
        Self { rx }
    }

    /// Take everything currently queued and keep only the newest entry
    pub fn drain_latest(&mut self) -> Drained {
        let mut latest = None;
        let mut received = 0usize;

        loop {
            match self.rx.try_recv() {
                Ok(content) => {
                    received += 1;
                    latest = Some(content);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if latest.is_none() {
                        return Drained::Closed;
                    }
                    break;
                }
            }
        }

        match latest {
            Some(content) => Drained::Latest {
                content,
                skipped: received - 1,
            },
            None => Drained::Nothing,
        }
    }
}
