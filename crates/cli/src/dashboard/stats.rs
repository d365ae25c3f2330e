//! Dashboard run statistics.

use std::time::Duration;

use channel::ChannelHealth;
use dispatcher::{MetricsSnapshot, WorkerState};
use observability::StatsSummary;

/// Final state of one channel
#[derive(Debug, Clone)]
pub struct ChannelStats {
    pub name: String,
    /// Health observed just before the channel was turned off
    pub health: ChannelHealth,
    /// Worker state reported by `turn_off` (`None` if it failed)
    pub worker: Option<WorkerState>,
    pub metrics: MetricsSnapshot,
}

/// Statistics from a dashboard run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Frames drawn by the main loop
    pub frames_rendered: u64,

    /// Time spent in the main loop
    pub duration: Duration,

    /// Per-frame compose + write time in milliseconds
    pub frame_time_ms: StatsSummary,

    pub channels: Vec<ChannelStats>,
}

impl RunStats {
    /// Average frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_rendered as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Channels not live at shutdown
    pub fn channels_without_signal(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| c.health != ChannelHealth::Live)
            .count()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Radiator Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames rendered: {}", self.frames_rendered);
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   ├─ Frame time (ms): {}", self.frame_time_ms);
        println!(
            "   └─ Channels without signal: {}/{}",
            self.channels_without_signal(),
            self.channels.len()
        );

        if !self.channels.is_empty() {
            println!("\n📡 Channels");
            for channel in &self.channels {
                let worker = channel
                    .worker
                    .map_or_else(|| "unknown".to_string(), |w| format!("{w:?}"));
                let m = &channel.metrics;
                println!("   ├─ {} [{}, worker {}]", channel.name, channel.health, worker);
                println!(
                    "   │    submitted={} dropped={} executed={} empty={} delivered={}",
                    m.submitted, m.dropped, m.executed, m.empty_results, m.delivered
                );
            }
        }

        let failed: Vec<&str> = self
            .channels
            .iter()
            .filter(|c| c.health == ChannelHealth::WorkerFailed)
            .map(|c| c.name.as_str())
            .collect();
        if !failed.is_empty() {
            println!("\n⚠️  Failed workers: {}", failed.join(", "));
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, health: ChannelHealth) -> ChannelStats {
        ChannelStats {
            name: name.into(),
            health,
            worker: Some(WorkerState::Stopped),
            metrics: MetricsSnapshot::default(),
        }
    }

    #[test]
    fn test_fps() {
        let stats = RunStats {
            frames_rendered: 50,
            duration: Duration::from_secs(5),
            ..RunStats::default()
        };
        assert!((stats.fps() - 10.0).abs() < f64::EPSILON);
        assert_eq!(RunStats::default().fps(), 0.0);
    }

    #[test]
    fn test_channels_without_signal() {
        let stats = RunStats {
            channels: vec![
                channel("a", ChannelHealth::Live),
                channel("b", ChannelHealth::NoSignal),
                channel("c", ChannelHealth::WorkerFailed),
            ],
            ..RunStats::default()
        };
        assert_eq!(stats.channels_without_signal(), 2);
    }
}
