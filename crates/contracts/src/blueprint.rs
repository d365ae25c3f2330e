//! RadiatorBlueprint - Config Loader output
//!
//! Describes the complete dashboard: display settings and the channels
//! (one per data source) that feed its panels.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{NamedColor, ScreenLayout};

/// Lower bound for a derived consumer drain period
pub const MIN_DRAIN_PERIOD: Duration = Duration::from_millis(10);

/// Shortest period a periodic producer or consumer accepts
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete dashboard blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiatorBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Channel definitions
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

/// Display settings: terminal geometry, frame rate, colours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Title drawn on the first screen row
    #[serde(default = "default_title")]
    pub title: String,

    /// Screen width in terminal columns
    #[serde(default = "default_width")]
    pub width: u16,

    /// Screen height in terminal rows
    #[serde(default = "default_height")]
    pub height: u16,

    /// Cells between neighbouring panels
    #[serde(default = "default_margin")]
    pub margin: u16,

    /// Main loop frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Panel arrangement
    #[serde(default)]
    pub layout: ScreenLayout,

    /// Default text colour
    #[serde(default = "default_foreground")]
    pub foreground: NamedColor,

    /// Foreground of the no-signal static noise
    #[serde(default = "default_static_foreground")]
    pub static_foreground: NamedColor,

    /// Background of the no-signal static noise
    #[serde(default = "default_static_background")]
    pub static_background: NamedColor,
}

fn default_title() -> String {
    "Radiator".to_string()
}

fn default_width() -> u16 {
    160
}

fn default_height() -> u16 {
    48
}

fn default_margin() -> u16 {
    1
}

fn default_frame_rate() -> f64 {
    10.0
}

fn default_foreground() -> NamedColor {
    NamedColor::White
}

fn default_static_foreground() -> NamedColor {
    NamedColor::Gray
}

fn default_static_background() -> NamedColor {
    NamedColor::Black
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            margin: default_margin(),
            frame_rate: default_frame_rate(),
            layout: ScreenLayout::default(),
            foreground: default_foreground(),
            static_foreground: default_static_foreground(),
            static_background: default_static_background(),
        }
    }
}

impl DisplayConfig {
    /// Interval between two frames of the main loop
    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.frame_rate).unwrap_or(Duration::from_millis(100))
    }
}

/// One data source and the panel it renders into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Unique channel name
    pub name: String,

    /// Content provider selection
    pub provider: ProviderConfig,

    /// Panel index (header, left, right, footer order)
    pub surface: usize,

    /// Fetch period in seconds, must be > 0
    #[serde(default = "default_update_period")]
    pub update_period_secs: f64,

    /// Consumer drain period in seconds (default: update period / 4)
    #[serde(default)]
    pub drain_period_secs: Option<f64>,

    /// Task queue bound (drop-on-full)
    #[serde(default = "default_task_queue_capacity")]
    pub task_queue_capacity: usize,

    /// Result queue bound
    #[serde(default = "default_result_queue_capacity")]
    pub result_queue_capacity: usize,

    /// How long the worker may take to exit before it is abandoned
    #[serde(default = "default_stop_grace")]
    pub stop_grace_secs: f64,

    /// Mark the channel stale when nothing fresh arrived for this long
    #[serde(default)]
    pub signal_timeout_secs: Option<f64>,
}

fn default_update_period() -> f64 {
    30.0
}

fn default_task_queue_capacity() -> usize {
    1
}

fn default_result_queue_capacity() -> usize {
    4
}

fn default_stop_grace() -> f64 {
    2.0
}

impl ChannelConfig {
    /// Channel with default timings
    pub fn new(name: impl Into<String>, provider: ProviderConfig, surface: usize) -> Self {
        Self {
            name: name.into(),
            provider,
            surface,
            update_period_secs: default_update_period(),
            drain_period_secs: None,
            task_queue_capacity: default_task_queue_capacity(),
            result_queue_capacity: default_result_queue_capacity(),
            stop_grace_secs: default_stop_grace(),
            signal_timeout_secs: None,
        }
    }

    pub fn update_period(&self) -> Duration {
        Duration::try_from_secs_f64(self.update_period_secs)
            .unwrap_or(Duration::from_secs(30))
    }

    /// Explicit drain period, or a quarter of the update period
    pub fn drain_period(&self) -> Duration {
        let derived = self.update_period() / 4;
        self.drain_period_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(derived)
            .max(MIN_DRAIN_PERIOD)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::try_from_secs_f64(self.stop_grace_secs).unwrap_or(Duration::from_secs(2))
    }

    pub fn signal_timeout(&self) -> Option<Duration> {
        self.signal_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// External command: program plus arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Built-in content providers, selected by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Any external command
    Command(CommandSpec),
    /// `first | second`
    Pipe {
        first: CommandSpec,
        second: CommandSpec,
    },
    /// Thread view of the radiator's parent process
    Top,
    /// Logged-in users
    W,
    /// finger output with the login highlighted
    Finger {
        #[serde(default)]
        login_name: Option<String>,
    },
    /// fortune piped through cowsay
    TheCow,
    /// Jenkins job status table
    JenkinsJobs { url: String, job_names: Vec<String> },
    /// Open Gerrit changes of a project owned by a team
    ///
    /// `url` is the Gerrit host. Credentials missing here are read from
    /// `RADIATOR_GERRIT_USER` and `RADIATOR_GERRIT_PASSWORD`.
    GerritOpenChanges {
        url: String,
        project: String,
        team: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    /// Local wall clock
    Clock {
        #[serde(default)]
        format: Option<String>,
    },
}

impl ProviderConfig {
    /// Short kind name, as written in configuration
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::Command(_) => "command",
            ProviderConfig::Pipe { .. } => "pipe",
            ProviderConfig::Top => "top",
            ProviderConfig::W => "w",
            ProviderConfig::Finger { .. } => "finger",
            ProviderConfig::TheCow => "the_cow",
            ProviderConfig::JenkinsJobs { .. } => "jenkins_jobs",
            ProviderConfig::GerritOpenChanges { .. } => "gerrit_open_changes",
            ProviderConfig::Clock { .. } => "clock",
        }
    }
}

impl RadiatorBlueprint {
    /// Factory settings: four shell channels on a 0+2+2+0 layout
    pub fn factory() -> Self {
        Self {
            version: ConfigVersion::V1,
            display: DisplayConfig::default(),
            channels: vec![
                ChannelConfig::new("top", ProviderConfig::Top, 0),
                ChannelConfig::new("cowsay", ProviderConfig::TheCow, 1),
                ChannelConfig::new("w", ProviderConfig::W, 2),
                ChannelConfig::new("finger", ProviderConfig::Finger { login_name: None }, 3),
            ],
        }
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.name == name)
    }
}
