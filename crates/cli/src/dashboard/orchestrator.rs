//! Dashboard orchestrator - channel startup, the main loop and shutdown.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use channel::Channel;
use contracts::RadiatorBlueprint;
use observability::{record_channels_no_signal, record_frame_rendered, RunningStats};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{ChannelStats, RunStats};
use crate::app_state::AppState;
use crate::error::CliError;
use crate::screen::Screen;

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Validated blueprint
    pub blueprint: RadiatorBlueprint,

    /// Stop after this long (None = until interrupted)
    pub duration: Option<Duration>,
}

/// Drives the screen from a set of channels
pub struct Dashboard {
    config: DashboardConfig,
    state: Arc<AppState>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Start every channel, draw frames until stopped, then turn everything off
    pub async fn run<W: Write>(self, out: &mut W) -> Result<RunStats> {
        let screen = Screen::new(&self.config.blueprint.display);
        screen.enter(out).context("Failed to prepare terminal")?;
        screen
            .draw_loading(out)
            .context("Failed to draw loading screen")?;

        let mut channels = Vec::with_capacity(self.config.blueprint.channels.len());
        let started = {
            let _suspended = self.state.suspend_signal_handling();
            self.start_channels(&screen, &mut channels)
        };
        if let Err(e) = started {
            warn!(error = %e, started = channels.len(), "Startup failed, turning channels off");
            shutdown_channels(&mut channels).await;
            screen.leave(out)?;
            return Err(e);
        }

        self.state.enter_main_loop();
        let started_at = Instant::now();
        let mut frame_times = RunningStats::default();
        let outcome = self
            .main_loop(&screen, &channels, out, &mut frame_times)
            .await;
        let duration = started_at.elapsed();

        let channel_stats = shutdown_channels(&mut channels).await;
        screen.leave(out)?;
        let frames_rendered = outcome?;

        Ok(RunStats {
            frames_rendered,
            duration,
            frame_time_ms: frame_times.summary(),
            channels: channel_stats,
        })
    }

    fn start_channels(&self, screen: &Screen, channels: &mut Vec<Channel>) -> Result<()> {
        let display = &self.config.blueprint.display;
        let static_fg = display.static_foreground.rgb();
        let static_bg = display.static_background.rgb();

        for config in &self.config.blueprint.channels {
            let panel = screen
                .panel(config.surface)
                .ok_or_else(|| CliError::MissingSurface {
                    channel: config.name.clone(),
                    surface: config.surface,
                    available: screen.panels().len(),
                })?;

            let fetch = content_providers::fetch_function_for(config)?;
            let mut channel = Channel::from_config(config, fetch, panel.render_function())
                .with_context(|| format!("Failed to build channel '{}'", config.name))?
                .with_static_hook(panel.static_hook(static_fg, static_bg));

            channel
                .turn_on()
                .with_context(|| format!("Failed to turn on channel '{}'", config.name))?;

            info!(
                channel = %config.name,
                provider = config.provider.kind(),
                surface = config.surface,
                "Channel started"
            );
            channels.push(channel);
        }

        info!(channels = channels.len(), "All channels started");
        Ok(())
    }

    async fn main_loop<W: Write>(
        &self,
        screen: &Screen,
        channels: &[Channel],
        out: &mut W,
        frame_times: &mut RunningStats,
    ) -> Result<u64> {
        let interval = self.config.blueprint.display.frame_interval();
        let deadline = self
            .config
            .duration
            .map(|d| tokio::time::Instant::now() + d);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            frame_ms = interval.as_millis() as u64,
            duration_secs = ?self.config.duration.map(|d| d.as_secs()),
            "Main loop started"
        );

        let mut frames = 0u64;
        while self.state.is_running() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.state.wait_stopped() => break,
                _ = until(deadline) => {
                    info!("Run duration elapsed");
                    break;
                }
            }

            let frame_start = Instant::now();
            let no_signal = channels.iter().filter(|c| c.display_static()).count();
            screen.draw(out).context("Failed to draw frame")?;

            let elapsed = frame_start.elapsed();
            frames += 1;
            frame_times.push(elapsed.as_secs_f64() * 1000.0);
            record_channels_no_signal(no_signal);
            record_frame_rendered(elapsed);
        }

        info!(frames, "Main loop finished");
        Ok(frames)
    }
}

async fn until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Turn every channel off in start order, collecting final statistics
///
/// Failures are logged; a channel that cannot stop never blocks the others.
async fn shutdown_channels(channels: &mut [Channel]) -> Vec<ChannelStats> {
    let mut stats = Vec::with_capacity(channels.len());
    for channel in channels.iter_mut() {
        let health = channel.health();
        let worker = match channel.turn_off().await {
            Ok(worker) => Some(worker),
            Err(e) => {
                warn!(channel = %channel.name(), error = %e, "Channel did not turn off cleanly");
                None
            }
        };
        debug!(channel = %channel.name(), %health, ?worker, "Channel shut down");

        stats.push(ChannelStats {
            name: channel.name().to_string(),
            health,
            worker,
            metrics: channel.metrics(),
        });
    }
    stats
}
