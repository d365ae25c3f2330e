//! Jenkins job status table
//!
//! For every configured job the provider reads the job summary, then the
//! current (newest) and last completed build. The job name is coloured by
//! the last build result, the status by the current build.

use std::time::Duration;

use chrono::Utc;
use contracts::{Content, ContentProvider, Line, Rgb, Span};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::ProviderError;

const JSON_API_URL: &str = "/api/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const COLUMN_JOB: &str = "Jenkins Job Name";
const COLUMN_STATUS: &str = "Status";
const COLUMN_ETA: &str = "E.T.A.";
const JOB_COLUMN_MIN_WIDTH: usize = 36;

#[derive(Debug, Deserialize)]
struct JobSummary {
    name: String,
    #[serde(default)]
    builds: Vec<BuildRef>,
}

#[derive(Debug, Deserialize)]
struct BuildRef {
    url: String,
}

/// Fields of a build record used for the table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub result: Option<String>,
    #[serde(default)]
    pub building: bool,
    /// Start time, ms since epoch
    #[serde(default)]
    pub timestamp: i64,
    /// Expected run time, ms
    #[serde(default)]
    pub estimated_duration: i64,
}

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub name: String,
    pub name_color: Rgb,
    pub status: String,
    pub status_color: Rgb,
    pub eta: String,
}

impl JobRow {
    fn new(name: String, current: &BuildInfo, last: Option<&BuildInfo>, now_ms: i64) -> Self {
        let name_color = last
            .and_then(|build| build.result.as_deref())
            .map(result_color)
            .unwrap_or(Rgb::WHITE);
        let (status, status_color) = job_status(current);

        Self {
            name,
            name_color,
            status,
            status_color,
            eta: job_eta(current, now_ms),
        }
    }
}

/// Colour for a finished build result
pub fn result_color(result: &str) -> Rgb {
    match result {
        "SUCCESS" => Rgb::GREEN,
        "FAILURE" => Rgb::RED,
        "UNSTABLE" => Rgb::YELLOW,
        _ => Rgb::WHITE,
    }
}

fn job_status(build: &BuildInfo) -> (String, Rgb) {
    match (&build.result, build.building) {
        (None, true) => ("BUILDING".to_string(), Rgb::WHITE),
        (Some(result), _) => (result.clone(), result_color(result)),
        (None, false) => ("N/A".to_string(), Rgb::WHITE),
    }
}

fn job_eta(build: &BuildInfo, now_ms: i64) -> String {
    if !build.building {
        return "N/A".to_string();
    }
    let eta = format_eta(build.timestamp, build.estimated_duration, now_ms);
    let percent = progress_percent(build.timestamp, build.estimated_duration, now_ms);
    format!("{eta:>8}, {percent:3}%")
}

/// Time left as `HH:MM:SS`, or `N/A` when the estimate has passed
pub fn format_eta(start_ms: i64, duration_ms: i64, now_ms: i64) -> String {
    // Server-supplied values; saturate rather than overflow
    let remaining_ms = start_ms.saturating_add(duration_ms).saturating_sub(now_ms);
    let Some(remaining) = chrono::Duration::try_milliseconds(remaining_ms) else {
        return "N/A".to_string();
    };
    if remaining < chrono::Duration::zero() {
        return "N/A".to_string();
    }
    let secs = remaining.num_seconds();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Elapsed share of the estimated duration, capped at 100
pub fn progress_percent(start_ms: i64, duration_ms: i64, now_ms: i64) -> i64 {
    if duration_ms <= 0 {
        return 100;
    }
    let elapsed = i128::from(now_ms) - i128::from(start_ms);
    let percent = (elapsed.max(0) * 100 / i128::from(duration_ms)).min(100);
    i64::try_from(percent).unwrap_or(100)
}

/// Render rows as a bordered table
pub fn render_table(rows: &[JobRow]) -> Content {
    let job_width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .chain([COLUMN_JOB.len(), JOB_COLUMN_MIN_WIDTH])
        .max()
        .unwrap_or(JOB_COLUMN_MIN_WIDTH);
    let status_width = rows
        .iter()
        .map(|row| row.status.chars().count())
        .chain([COLUMN_STATUS.len() + 2])
        .max()
        .unwrap_or(COLUMN_STATUS.len());
    let eta_width = rows
        .iter()
        .map(|row| row.eta.chars().count())
        .chain([COLUMN_ETA.len() + 10])
        .max()
        .unwrap_or(COLUMN_ETA.len());

    let border = format!(
        "+{}+{}+{}+",
        "-".repeat(job_width + 2),
        "-".repeat(status_width + 2),
        "-".repeat(eta_width + 2)
    );

    let mut content = Content::empty();
    content.push(border.as_str());
    content.push(format!(
        "| {} | {} | {} |",
        pad_left(COLUMN_JOB, job_width),
        center(COLUMN_STATUS, status_width),
        center(COLUMN_ETA, eta_width)
    ));
    content.push(border.as_str());
    for row in rows {
        content.push(Line::new(vec![
            Span::plain("| "),
            Span::colored(pad_left(&row.name, job_width), row.name_color),
            Span::plain(" | "),
            Span::colored(center(&row.status, status_width), row.status_color),
            Span::plain(" | "),
            Span::colored(center(&row.eta, eta_width), Rgb::WHITE),
            Span::plain(" |"),
        ]));
    }
    content.push(border);
    content
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn center(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}

/// Status table for a list of jobs on one Jenkins server
pub struct JenkinsJobsProvider {
    url: String,
    job_names: Vec<String>,
}

impl JenkinsJobsProvider {
    pub fn new(url: impl Into<String>, job_names: Vec<String>) -> Result<Self, ProviderError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ProviderError::creation("jenkins_jobs", "url cannot be empty"));
        }
        Ok(Self { url, job_names })
    }

    fn collect_rows(&self) -> Result<Vec<JobRow>, ProviderError> {
        // Built per fetch: a blocking client must not live inside the async runtime
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {e}")))?;

        let now_ms = Utc::now().timestamp_millis();
        self.job_names
            .iter()
            .map(|job| self.job_row(&client, job, now_ms))
            .collect()
    }

    fn job_row(
        &self,
        client: &reqwest::blocking::Client,
        job: &str,
        now_ms: i64,
    ) -> Result<JobRow, ProviderError> {
        trace!(job, "Reading job status");
        let summary_url = format!("{}{}{}", self.url, job, JSON_API_URL);
        let summary: JobSummary = get_json(client, &summary_url)?;

        let current = summary
            .builds
            .first()
            .ok_or_else(|| ProviderError::InvalidResponse(format!("job '{job}' has no builds")))?;
        let current: BuildInfo = get_json(client, &api_url(&current.url))?;
        let last: Option<BuildInfo> = match summary.builds.get(1) {
            Some(build) => Some(get_json(client, &api_url(&build.url))?),
            None => None,
        };

        Ok(JobRow::new(summary.name, &current, last.as_ref(), now_ms))
    }
}

fn api_url(build_url: &str) -> String {
    format!("{}{}", build_url.trim_end_matches('/'), JSON_API_URL)
}

fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<T, ProviderError> {
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(ProviderError::Http(format!("HTTP {} from {}", response.status(), url)));
    }
    let body = response.bytes()?;
    Ok(serde_json::from_slice(&body)?)
}

impl ContentProvider for JenkinsJobsProvider {
    fn name(&self) -> &str {
        "jenkins_jobs"
    }

    fn fetch(&self) -> Content {
        match self.collect_rows() {
            Ok(rows) => render_table(&rows),
            Err(e) => {
                debug!(provider = self.name(), url = %self.url, error = %e, "Jenkins query failed");
                Content::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(result: Option<&str>, building: bool) -> BuildInfo {
        BuildInfo {
            result: result.map(str::to_string),
            building,
            timestamp: 1_000_000,
            estimated_duration: 600_000,
        }
    }

    #[test]
    fn test_build_info_from_jenkins_json() {
        let json = r#"{"result":null,"building":true,"timestamp":1700000000000,"estimatedDuration":90000,"number":12}"#;
        let info: BuildInfo = serde_json::from_str(json).unwrap();
        assert!(info.building);
        assert!(info.result.is_none());
        assert_eq!(info.estimated_duration, 90_000);
    }

    #[test]
    fn test_format_eta() {
        // 10 minutes estimate, 4 minutes elapsed
        assert_eq!(format_eta(0, 600_000, 240_000), "00:06:00");
        assert_eq!(format_eta(0, 7_200_000, 0), "02:00:00");
        assert_eq!(format_eta(0, 600_000, 700_000), "N/A");
    }

    #[test]
    fn test_progress_percent_is_capped() {
        assert_eq!(progress_percent(0, 600_000, 300_000), 50);
        assert_eq!(progress_percent(0, 600_000, 900_000), 100);
        assert_eq!(progress_percent(0, 0, 10), 100);
    }

    #[test]
    fn test_eta_and_progress_survive_extreme_timestamps() {
        assert_eq!(format_eta(i64::MAX, i64::MAX, i64::MIN), "2562047788015:12:55");
        assert_eq!(format_eta(i64::MIN, i64::MIN, i64::MAX), "N/A");
        assert_eq!(format_eta(0, 0, i64::MIN), "2562047788015:12:55");

        assert_eq!(progress_percent(i64::MIN, 1, i64::MAX), 100);
        assert_eq!(progress_percent(i64::MAX, 1, i64::MIN), 0);
        assert_eq!(progress_percent(0, i64::MAX, i64::MAX / 2), 49);
    }

    #[test]
    fn test_row_colors() {
        let current = build(None, true);
        let last = build(Some("FAILURE"), false);
        let row = JobRow::new("nightly".into(), &current, Some(&last), 1_300_000);

        assert_eq!(row.name_color, Rgb::RED);
        assert_eq!(row.status, "BUILDING");
        assert_eq!(row.status_color, Rgb::WHITE);
        assert_eq!(row.eta, "00:05:00,  50%");
    }

    #[test]
    fn test_finished_build_has_no_eta() {
        let current = build(Some("UNSTABLE"), false);
        let row = JobRow::new("release".into(), &current, None, 0);
        assert_eq!(row.status_color, Rgb::YELLOW);
        assert_eq!(row.name_color, Rgb::WHITE);
        assert_eq!(row.eta, "N/A");
    }

    #[test]
    fn test_render_table_layout() {
        let rows = vec![JobRow {
            name: "nightly".into(),
            name_color: Rgb::GREEN,
            status: "SUCCESS".into(),
            status_color: Rgb::GREEN,
            eta: "N/A".into(),
        }];
        let table = render_table(&rows);
        let texts = table.texts();

        // border, header, border, one row, border
        assert_eq!(texts.len(), 5);
        assert!(texts[0].starts_with("+-"));
        assert!(texts[1].contains(COLUMN_JOB));
        assert!(texts[3].contains("nightly"));
        assert!(texts.iter().all(|line| line.chars().count() == texts[0].chars().count()));

        let row = &table.lines()[3];
        assert_eq!(row.spans[3].color, Rgb::GREEN);
        assert_eq!(row.spans[3].text.trim(), "SUCCESS");
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(JenkinsJobsProvider::new(" ", vec!["a".into()]).is_err());
    }

    #[test]
    fn test_unreachable_server_gives_empty_content() {
        let provider =
            JenkinsJobsProvider::new("http://127.0.0.1:9/job/", vec!["nightly".into()]).unwrap();
        assert!(provider.fetch().is_empty());
    }
}
