//! Configuration validation
//!
//! Rules:
//! - the layout has at least one panel row
//! - display geometry and frame rate are positive
//! - channel names are non-empty and unique
//! - periods are at least one millisecond, queue capacities at least 1
//! - every channel targets an existing surface
//! - provider-specific required fields are present

use std::collections::HashSet;

use std::time::Duration;

use contracts::{ChannelConfig, ContractError, ProviderConfig, RadiatorBlueprint, MIN_PERIOD};

/// Validate a RadiatorBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RadiatorBlueprint) -> Result<(), ContractError> {
    validate_display(blueprint)?;
    validate_channel_names(blueprint)?;
    for channel in &blueprint.channels {
        validate_channel_timings(channel)?;
        validate_channel_queues(channel)?;
        validate_channel_surface(blueprint, channel)?;
        validate_provider(channel)?;
    }
    Ok(())
}

fn validate_display(blueprint: &RadiatorBlueprint) -> Result<(), ContractError> {
    let display = &blueprint.display;

    if display.layout.total_rows() == 0 {
        return Err(ContractError::config_validation(
            "display.layout",
            format!(
                "layout '{}' has zero configured display rows",
                display.layout
            ),
        ));
    }

    if !(display.frame_rate > 0.0 && display.frame_rate.is_finite()) {
        return Err(ContractError::config_validation(
            "display.frame_rate",
            format!("frame_rate must be > 0, got {}", display.frame_rate),
        ));
    }

    if display.width == 0 || display.height == 0 {
        return Err(ContractError::config_validation(
            "display.width / display.height",
            format!(
                "screen size must be non-zero, got {}x{}",
                display.width, display.height
            ),
        ));
    }

    Ok(())
}

fn validate_channel_names(blueprint: &RadiatorBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, channel) in blueprint.channels.iter().enumerate() {
        if channel.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("channels[{idx}].name"),
                "channel name cannot be empty",
            ));
        }
        if !seen.insert(channel.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("channels[name={}]", channel.name),
                "duplicate channel name",
            ));
        }
    }
    Ok(())
}

/// A period in seconds that converts to at least `MIN_PERIOD`
fn usable_period(secs: f64) -> bool {
    Duration::try_from_secs_f64(secs).is_ok_and(|period| period >= MIN_PERIOD)
}

fn validate_channel_timings(channel: &ChannelConfig) -> Result<(), ContractError> {
    let field = |name: &str| format!("channels[{}].{name}", channel.name);

    if !usable_period(channel.update_period_secs) {
        return Err(ContractError::config_validation(
            field("update_period_secs"),
            format!(
                "update_period_secs must be >= {}, got {}",
                MIN_PERIOD.as_secs_f64(),
                channel.update_period_secs
            ),
        ));
    }

    if let Some(drain) = channel.drain_period_secs {
        if !usable_period(drain) {
            return Err(ContractError::config_validation(
                field("drain_period_secs"),
                format!(
                    "drain_period_secs must be >= {}, got {drain}",
                    MIN_PERIOD.as_secs_f64()
                ),
            ));
        }
    }

    if !(channel.stop_grace_secs >= 0.0 && channel.stop_grace_secs.is_finite()) {
        return Err(ContractError::config_validation(
            field("stop_grace_secs"),
            format!(
                "stop_grace_secs must be >= 0, got {}",
                channel.stop_grace_secs
            ),
        ));
    }

    if let Some(timeout) = channel.signal_timeout_secs {
        if !usable_period(timeout) {
            return Err(ContractError::config_validation(
                field("signal_timeout_secs"),
                format!(
                    "signal_timeout_secs must be >= {}, got {timeout}",
                    MIN_PERIOD.as_secs_f64()
                ),
            ));
        }
    }

    Ok(())
}

fn validate_channel_queues(channel: &ChannelConfig) -> Result<(), ContractError> {
    if channel.task_queue_capacity == 0 {
        return Err(ContractError::config_validation(
            format!("channels[{}].task_queue_capacity", channel.name),
            "task_queue_capacity must be >= 1",
        ));
    }
    if channel.result_queue_capacity == 0 {
        return Err(ContractError::config_validation(
            format!("channels[{}].result_queue_capacity", channel.name),
            "result_queue_capacity must be >= 1",
        ));
    }
    Ok(())
}

fn validate_channel_surface(
    blueprint: &RadiatorBlueprint,
    channel: &ChannelConfig,
) -> Result<(), ContractError> {
    let total = blueprint.display.layout.total_rows();
    if channel.surface >= total {
        return Err(ContractError::config_validation(
            format!("channels[{}].surface", channel.name),
            format!(
                "surface {} out of range, layout '{}' has {} surfaces",
                channel.surface, blueprint.display.layout, total
            ),
        ));
    }
    Ok(())
}

fn validate_provider(channel: &ChannelConfig) -> Result<(), ContractError> {
    let field = format!("channels[{}].provider", channel.name);
    match &channel.provider {
        ProviderConfig::Command(spec) if spec.program.trim().is_empty() => Err(
            ContractError::config_validation(field, "command program cannot be empty"),
        ),
        ProviderConfig::Pipe { first, second }
            if first.program.trim().is_empty() || second.program.trim().is_empty() =>
        {
            Err(ContractError::config_validation(
                field,
                "both pipe programs must be set",
            ))
        }
        ProviderConfig::JenkinsJobs { url, .. } if url.trim().is_empty() => Err(
            ContractError::config_validation(field, "jenkins url cannot be empty"),
        ),
        ProviderConfig::GerritOpenChanges {
            url, project, team, ..
        } if [url, project, team].iter().any(|value| value.trim().is_empty()) => {
            Err(ContractError::config_validation(
                field,
                "gerrit url, project and team must be set",
            ))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CommandSpec, ScreenLayout};

    fn minimal_blueprint() -> RadiatorBlueprint {
        RadiatorBlueprint::factory()
    }

    fn expect_error(bp: &RadiatorBlueprint, needle: &str) {
        let result = validate(bp);
        assert!(result.is_err(), "expected error containing {needle:?}");
        let err = result.unwrap_err().to_string();
        assert!(err.contains(needle), "got: {err}");
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_display_rows() {
        let mut bp = minimal_blueprint();
        bp.display.layout = ScreenLayout::new(0, 0, 0, 0);
        expect_error(&bp, "zero configured display rows");
    }

    #[test]
    fn test_invalid_frame_rate() {
        let mut bp = minimal_blueprint();
        bp.display.frame_rate = 0.0;
        expect_error(&bp, "frame_rate must be > 0");
    }

    #[test]
    fn test_duplicate_channel_name() {
        let mut bp = minimal_blueprint();
        let dup = bp.channels[0].clone();
        bp.channels.push(dup);
        expect_error(&bp, "duplicate channel name");
    }

    #[test]
    fn test_empty_channel_name() {
        let mut bp = minimal_blueprint();
        bp.channels[0].name = String::new();
        expect_error(&bp, "cannot be empty");
    }

    #[test]
    fn test_invalid_update_period() {
        let mut bp = minimal_blueprint();
        bp.channels[1].update_period_secs = -1.0;
        expect_error(&bp, "update_period_secs must be >=");
    }

    #[test]
    fn test_update_period_rounding_to_zero() {
        let mut bp = minimal_blueprint();
        bp.channels[1].update_period_secs = 1e-10;
        expect_error(&bp, "update_period_secs must be >= 0.001");

        bp.channels[1].update_period_secs = 0.001;
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_tiny_signal_timeout() {
        let mut bp = minimal_blueprint();
        bp.channels[0].signal_timeout_secs = Some(1e-9);
        expect_error(&bp, "signal_timeout_secs must be >=");
    }

    #[test]
    fn test_invalid_drain_period() {
        let mut bp = minimal_blueprint();
        bp.channels[1].drain_period_secs = Some(0.0);
        expect_error(&bp, "drain_period_secs must be >=");
    }

    #[test]
    fn test_zero_task_queue() {
        let mut bp = minimal_blueprint();
        bp.channels[2].task_queue_capacity = 0;
        expect_error(&bp, "task_queue_capacity must be >= 1");
    }

    #[test]
    fn test_surface_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.channels[3].surface = 4;
        expect_error(&bp, "out of range");
    }

    #[test]
    fn test_empty_command_program() {
        let mut bp = minimal_blueprint();
        bp.channels[0].provider = ProviderConfig::Command(CommandSpec::new(" ", ["-a"]));
        expect_error(&bp, "program cannot be empty");
    }

    #[test]
    fn test_blank_gerrit_team() {
        let mut bp = minimal_blueprint();
        bp.channels[0].provider = ProviderConfig::GerritOpenChanges {
            url: "review.example.org".into(),
            project: "radiator".into(),
            team: "  ".into(),
            user: None,
            password: None,
        };
        expect_error(&bp, "gerrit url, project and team must be set");
    }

    #[test]
    fn test_empty_jenkins_url() {
        let mut bp = minimal_blueprint();
        bp.channels[0].provider = ProviderConfig::JenkinsJobs {
            url: String::new(),
            job_names: vec!["nightly".into()],
        };
        expect_error(&bp, "jenkins url cannot be empty");
    }
}
