//! Channel pipeline metrics
//!
//! Thin wrappers over the `metrics` facade, labelled by channel name,
//! plus an online statistics helper for run summaries.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Task accepted by the task queue
pub fn record_task_submitted(channel: &str) {
    counter!("radiator_tasks_submitted_total", "channel" => channel.to_string()).increment(1);
}

/// Task dropped because the task queue was full
pub fn record_task_dropped(channel: &str) {
    counter!("radiator_tasks_dropped_total", "channel" => channel.to_string()).increment(1);
}

/// Task executed by the worker, with its wall-clock duration
pub fn record_task_executed(channel: &str, elapsed: Duration, empty: bool) {
    counter!("radiator_tasks_executed_total", "channel" => channel.to_string()).increment(1);
    histogram!("radiator_fetch_duration_ms", "channel" => channel.to_string())
        .record(elapsed.as_secs_f64() * 1000.0);
    if empty {
        counter!("radiator_results_empty_total", "channel" => channel.to_string()).increment(1);
    }
}

/// Non-empty result handed to the render callback
pub fn record_result_delivered(channel: &str) {
    counter!("radiator_results_delivered_total", "channel" => channel.to_string()).increment(1);
}

/// Worker thread died while running a task
pub fn record_worker_failure(channel: &str) {
    counter!("radiator_worker_failures_total", "channel" => channel.to_string()).increment(1);
}

/// Number of channels currently showing no signal
pub fn record_channels_no_signal(count: usize) {
    gauge!("radiator_channels_no_signal").set(count as f64);
}

/// One main-loop frame drawn
pub fn record_frame_rendered(elapsed: Duration) {
    counter!("radiator_frames_rendered_total").increment(1);
    histogram!("radiator_frame_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut stats = RunningStats::default();
        assert_eq!(stats.summary().to_string(), "N/A");

        stats.push(20.0);
        stats.push(80.0);
        let output = stats.summary().to_string();
        assert!(output.contains("min=20.000"));
        assert!(output.contains("n=2"));
    }

    #[test]
    fn test_recorders_without_installed_recorder() {
        // The metrics facade is a no-op until a recorder is installed.
        record_task_submitted("c");
        record_task_dropped("c");
        record_task_executed("c", Duration::from_millis(3), true);
        record_result_delivered("c");
        record_worker_failure("c");
        record_channels_no_signal(1);
        record_frame_rendered(Duration::from_millis(1));
    }
}
