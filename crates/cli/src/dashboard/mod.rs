//! Dashboard orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{Dashboard, DashboardConfig};
pub use stats::{ChannelStats, RunStats};
