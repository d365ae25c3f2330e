//! Executor - runs fetch tasks on an isolated worker thread
//!
//! The worker owns the receiving end of the task queue and the sending end of
//! the result queue. It runs one task at a time, in FIFO order, until it sees
//! the stop sentinel or the task queue closes. Tasks may block for arbitrary
//! time (child processes, HTTP) without touching the async runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use contracts::Content;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::DispatcherError;
use crate::metrics::ChannelMetrics;
use crate::task::{Envelope, ResultQueue, TaskQueue};

const COMPONENT: &str = "executor";

/// Lifecycle of the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Not started yet
    Idle,
    /// Worker thread is consuming tasks
    Running,
    /// Worker exited cleanly
    Stopped,
    /// Worker died while running a task
    Failed,
    /// Worker ignored the stop request and was detached
    Abandoned,
}

impl WorkerState {
    /// Whether the worker will not run any more tasks
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed | Self::Abandoned)
    }
}

/// Executor settings
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Task queue bound (>= 1)
    pub task_queue_capacity: usize,
    /// Result queue bound (>= 1)
    pub result_queue_capacity: usize,
    /// How long `stop` waits for the worker before detaching it
    pub grace_period: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            task_queue_capacity: 1,
            result_queue_capacity: 4,
            grace_period: Duration::from_secs(2),
        }
    }
}

/// Owns the worker thread and both queue endpoints until they are handed out
pub struct Executor {
    name: String,
    grace_period: Duration,
    metrics: Arc<ChannelMetrics>,
    /// Executor's own sender, used for the stop sentinel
    stop_tx: Option<mpsc::Sender<Envelope>>,
    task_rx: Option<mpsc::Receiver<Envelope>>,
    result_tx: Option<mpsc::Sender<Content>>,
    task_queue: Option<TaskQueue>,
    result_queue: Option<ResultQueue>,
    /// Set on stop; the worker discards queued tasks once it is up
    stopping: Arc<AtomicBool>,
    state_tx: Option<watch::Sender<WorkerState>>,
    state_rx: watch::Receiver<WorkerState>,
    worker: Option<thread::JoinHandle<()>>,
    abandoned: bool,
}

impl Executor {
    /// Create the executor and its queues. No thread is spawned yet.
    pub fn new(
        name: impl Into<String>,
        config: ExecutorConfig,
        metrics: Arc<ChannelMetrics>,
    ) -> Self {
        let name = name.into();
        let (task_tx, task_rx) = mpsc::channel(config.task_queue_capacity.max(1));
        let (result_tx, result_rx) = mpsc::channel(config.result_queue_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);

        Self {
            task_queue: Some(TaskQueue::new(name.clone(), task_tx.clone(), metrics.clone())),
            result_queue: Some(ResultQueue::new(result_rx)),
            name,
            grace_period: config.grace_period,
            metrics,
            stop_tx: Some(task_tx),
            task_rx: Some(task_rx),
            result_tx: Some(result_tx),
            stopping: Arc::new(AtomicBool::new(false)),
            state_tx: Some(state_tx),
            state_rx,
            worker: None,
            abandoned: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hand out the producer side of the task queue (once)
    pub fn take_task_queue(&mut self) -> Result<TaskQueue, DispatcherError> {
        self.task_queue
            .take()
            .ok_or_else(|| DispatcherError::queue_taken("task", &self.name))
    }

    /// Hand out the consumer side of the result queue (once)
    pub fn take_result_queue(&mut self) -> Result<ResultQueue, DispatcherError> {
        self.result_queue
            .take()
            .ok_or_else(|| DispatcherError::queue_taken("result", &self.name))
    }

    /// Current worker state
    pub fn state(&self) -> WorkerState {
        if self.abandoned {
            WorkerState::Abandoned
        } else {
            *self.state_rx.borrow()
        }
    }

    /// Watch worker state changes
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state_rx.clone()
    }

    /// Spawn the worker thread
    #[instrument(name = "executor_start", skip(self), fields(channel = %self.name))]
    pub fn start(&mut self) -> Result<(), DispatcherError> {
        let (task_rx, result_tx, state_tx) =
            match (self.task_rx.take(), self.result_tx.take(), self.state_tx.take()) {
                (Some(task_rx), Some(result_tx), Some(state_tx)) => (task_rx, result_tx, state_tx),
                _ => return Err(DispatcherError::already_started(COMPONENT, &self.name)),
            };

        state_tx.send_replace(WorkerState::Running);

        let guard = ExitGuard {
            name: self.name.clone(),
            state: state_tx,
        };
        let worker = Worker {
            name: self.name.clone(),
            task_rx,
            result_tx,
            stopping: self.stopping.clone(),
            metrics: self.metrics.clone(),
        };

        let handle = thread::Builder::new()
            .name(format!("radiator-worker-{}", self.name))
            .spawn(move || {
                let _guard = guard;
                worker.run();
            })
            .map_err(|source| DispatcherError::WorkerSpawn {
                name: self.name.clone(),
                source,
            })?;

        self.worker = Some(handle);
        debug!(channel = %self.name, "Executor started");
        Ok(())
    }

    /// Stop the worker, waiting at most the grace period
    ///
    /// Tasks still queued are discarded. A task already running is allowed to
    /// finish within the grace period; otherwise the worker thread is detached
    /// and reported as [`WorkerState::Abandoned`].
    #[instrument(name = "executor_stop", skip(self), fields(channel = %self.name))]
    pub async fn stop(&mut self) -> Result<WorkerState, DispatcherError> {
        let handle = self
            .worker
            .take()
            .ok_or_else(|| DispatcherError::not_running(COMPONENT, &self.name))?;

        self.stopping.store(true, Ordering::Release);
        let deadline = tokio::time::Instant::now() + self.grace_period;

        if let Some(tx) = self.stop_tx.take() {
            match tokio::time::timeout_at(deadline, tx.send(Envelope::Stop)).await {
                Ok(Ok(())) => trace!(channel = %self.name, "Stop sentinel queued"),
                Ok(Err(_)) => trace!(channel = %self.name, "Task queue already closed"),
                Err(_) => warn!(channel = %self.name, "Task queue full, stop sentinel not delivered"),
            }
        }

        let mut state_rx = self.state_rx.clone();
        let exited = tokio::time::timeout_at(deadline, async move {
            state_rx
                .wait_for(|state| state.is_terminal())
                .await
                .map(|state| *state)
        })
        .await;

        match exited {
            Ok(state) => {
                let state = state.unwrap_or(WorkerState::Stopped);
                if tokio::task::spawn_blocking(move || handle.join()).await.is_err() {
                    error!(channel = %self.name, "Failed to join worker thread");
                }
                debug!(channel = %self.name, state = ?state, "Executor stopped");
                Ok(state)
            }
            Err(_) => {
                warn!(
                    channel = %self.name,
                    grace_ms = self.grace_period.as_millis() as u64,
                    "Worker did not exit within grace period, abandoning it"
                );
                self.abandoned = true;
                drop(handle);
                Ok(WorkerState::Abandoned)
            }
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        if self.worker.take().is_some() {
            self.stopping.store(true, Ordering::Release);
            if let Some(tx) = self.stop_tx.take() {
                let _ = tx.try_send(Envelope::Stop);
            }
            warn!(channel = %self.name, "Executor dropped while running, worker detached");
        }
    }
}

/// State carried by the worker thread
struct Worker {
    name: String,
    task_rx: mpsc::Receiver<Envelope>,
    result_tx: mpsc::Sender<Content>,
    stopping: Arc<AtomicBool>,
    metrics: Arc<ChannelMetrics>,
}

impl Worker {
    fn run(mut self) {
        debug!(channel = %self.name, "Worker started");

        while let Some(envelope) = self.task_rx.blocking_recv() {
            let task = match envelope {
                Envelope::Run(task) => task,
                Envelope::Stop => {
                    trace!(channel = %self.name, "Stop sentinel received");
                    break;
                }
            };

            if self.stopping.load(Ordering::Acquire) {
                trace!(channel = %self.name, seq = task.seq(), "Discarding queued task");
                continue;
            }

            let seq = task.seq();
            let started = Instant::now();
            let content = task.invoke();
            let elapsed = started.elapsed();

            self.metrics.inc_executed();
            if content.is_empty() {
                self.metrics.inc_empty_results();
            }
            observability::record_task_executed(&self.name, elapsed, content.is_empty());
            trace!(
                channel = %self.name,
                seq,
                lines = content.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Task executed"
            );

            if self.result_tx.blocking_send(content).is_err() {
                debug!(channel = %self.name, "Result queue closed, worker exiting");
                break;
            }
        }
    }
}

/// Publishes the terminal state when the worker thread unwinds or returns
struct ExitGuard {
    name: String,
    state: watch::Sender<WorkerState>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(channel = %self.name, "Worker died while running a task");
            observability::record_worker_failure(&self.name);
            self.state.send_replace(WorkerState::Failed);
        } else {
            info!(channel = %self.name, "Worker stopped");
            self.state.send_replace(WorkerState::Stopped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Drained, SubmitOutcome, Task};
    use contracts::FetchFunction;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn config(grace_ms: u64) -> ExecutorConfig {
        ExecutorConfig {
            task_queue_capacity: 4,
            result_queue_capacity: 4,
            grace_period: Duration::from_millis(grace_ms),
        }
    }

    fn counting_fetch(counter: Arc<AtomicUsize>) -> FetchFunction {
        Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Content::from_plain([format!("run {n}")])
        })
    }

    async fn wait_for_results(results: &mut ResultQueue, timeout: Duration) -> Option<Content> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Drained::Latest { content, .. } = results.drain_latest() {
                return Some(content);
            }
            sleep(Duration::from_millis(5)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_executor_runs_submitted_tasks() {
        let metrics = Arc::new(ChannelMetrics::new());
        let mut executor = Executor::new("test", config(500), metrics.clone());
        let tasks = executor.take_task_queue().unwrap();
        let mut results = executor.take_result_queue().unwrap();
        executor.start().unwrap();
        assert_eq!(executor.state(), WorkerState::Running);

        let counter = Arc::new(AtomicUsize::new(0));
        for seq in 0..3 {
            assert_eq!(
                tasks.try_submit(Task::new(seq, counting_fetch(counter.clone()))),
                SubmitOutcome::Accepted
            );
        }

        let mut seen = Vec::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while seen.len() < 3 && tokio::time::Instant::now() < deadline {
            if let Some(content) = wait_for_results(&mut results, Duration::from_millis(50)).await {
                seen.push(content.texts()[0].clone());
            }
        }
        // Draining keeps only the newest, so the final run is always observed
        assert_eq!(seen.last().map(String::as_str), Some("run 2"));
        assert_eq!(metrics.executed(), 3);

        let state = executor.stop().await.unwrap();
        assert_eq!(state, WorkerState::Stopped);
        assert_eq!(executor.state(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let mut executor = Executor::new("test", config(200), Arc::new(ChannelMetrics::new()));
        executor.start().unwrap();
        assert!(matches!(
            executor.start(),
            Err(DispatcherError::AlreadyStarted { .. })
        ));
        executor.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_fails() {
        let mut executor = Executor::new("test", config(200), Arc::new(ChannelMetrics::new()));
        assert!(matches!(
            executor.stop().await,
            Err(DispatcherError::NotRunning { .. })
        ));
    }

    #[tokio::test]
    async fn test_queues_taken_once() {
        let mut executor = Executor::new("test", config(200), Arc::new(ChannelMetrics::new()));
        assert!(executor.take_task_queue().is_ok());
        assert!(matches!(
            executor.take_task_queue(),
            Err(DispatcherError::QueueTaken { queue: "task", .. })
        ));
        assert!(executor.take_result_queue().is_ok());
        assert!(executor.take_result_queue().is_err());
    }

    #[tokio::test]
    async fn test_stop_discards_queued_tasks() {
        let mut executor = Executor::new(
            "test",
            ExecutorConfig {
                task_queue_capacity: 3,
                result_queue_capacity: 8,
                grace_period: Duration::from_secs(2),
            },
            Arc::new(ChannelMetrics::new()),
        );
        let tasks = executor.take_task_queue().unwrap();
        let _results = executor.take_result_queue().unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        let slow_counter = counter.clone();
        let slow: FetchFunction = Arc::new(move || {
            std::thread::sleep(Duration::from_millis(150));
            slow_counter.fetch_add(1, Ordering::SeqCst);
            Content::from_plain(["slow"])
        });

        executor.start().unwrap();
        for seq in 0..3 {
            tasks.try_submit(Task::new(seq, slow.clone()));
        }
        sleep(Duration::from_millis(30)).await;

        let state = executor.stop().await.unwrap();
        assert_eq!(state, WorkerState::Stopped);
        // Only the task already in flight ran
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_abandons_stuck_worker() {
        let mut executor = Executor::new("test", config(100), Arc::new(ChannelMetrics::new()));
        let tasks = executor.take_task_queue().unwrap();
        let _results = executor.take_result_queue().unwrap();
        executor.start().unwrap();

        let stuck: FetchFunction = Arc::new(|| {
            std::thread::sleep(Duration::from_secs(2));
            Content::empty()
        });
        tasks.try_submit(Task::new(0, stuck.clone()));
        tasks.try_submit(Task::new(1, stuck.clone()));
        tasks.try_submit(Task::new(2, stuck));
        sleep(Duration::from_millis(20)).await;

        let started = std::time::Instant::now();
        let state = executor.stop().await.unwrap();
        assert_eq!(state, WorkerState::Abandoned);
        assert_eq!(executor.state(), WorkerState::Abandoned);
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_panicking_task_marks_worker_failed() {
        let mut executor = Executor::new("test", config(500), Arc::new(ChannelMetrics::new()));
        let tasks = executor.take_task_queue().unwrap();
        let mut results = executor.take_result_queue().unwrap();
        let mut state_rx = executor.subscribe();
        executor.start().unwrap();

        let boom: FetchFunction = Arc::new(|| -> Content { panic!("fetch exploded") });
        tasks.try_submit(Task::new(0, boom));

        tokio::time::timeout(
            Duration::from_secs(2),
            state_rx.wait_for(|state| *state == WorkerState::Failed),
        )
        .await
        .expect("worker should fail")
        .unwrap();

        assert!(matches!(results.drain_latest(), Drained::Closed));
        assert_eq!(
            tasks.try_submit(Task::new(1, Arc::new(Content::empty))),
            SubmitOutcome::Closed
        );
        assert_eq!(executor.stop().await.unwrap(), WorkerState::Failed);
    }

    #[tokio::test]
    async fn test_worker_exits_when_result_queue_dropped() {
        let mut executor = Executor::new("test", config(500), Arc::new(ChannelMetrics::new()));
        let tasks = executor.take_task_queue().unwrap();
        let results = executor.take_result_queue().unwrap();
        drop(results);
        executor.start().unwrap();

        tasks.try_submit(Task::new(0, Arc::new(|| Content::from_plain(["x"]))));

        let mut state_rx = executor.subscribe();
        tokio::time::timeout(
            Duration::from_secs(2),
            state_rx.wait_for(|state| state.is_terminal()),
        )
        .await
        .expect("worker should exit")
        .unwrap();
        assert_eq!(executor.state(), WorkerState::Stopped);
    }
}
