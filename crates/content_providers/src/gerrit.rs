//! Gerrit open changes table
//!
//! Queries `project:<p> AND status:open AND ownerin:<team>` through the
//! authenticated REST endpoint and lists the changes oldest first.

use std::time::Duration;

use contracts::{Content, ContentProvider};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;

/// Prefix Gerrit puts in front of every JSON body
const XSSI_PREFIX: &str = ")]}'";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const USER_ENV: &str = "RADIATOR_GERRIT_USER";
pub const PASSWORD_ENV: &str = "RADIATOR_GERRIT_PASSWORD";

const COLUMNS: [&str; 3] = ["Created", "Owner", "Subject"];

#[derive(Debug, Deserialize)]
struct ChangeOwner {
    name: Option<String>,
    #[serde(rename = "_account_id")]
    account_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ChangeInfo {
    created: String,
    owner: ChangeOwner,
    subject: String,
}

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRow {
    pub created: String,
    pub owner: String,
    pub subject: String,
}

impl From<ChangeInfo> for ChangeRow {
    fn from(change: ChangeInfo) -> Self {
        // "2024-03-01 09:41:37.000000000" keeps millisecond precision
        let keep = change.created.chars().count().saturating_sub(6);
        let owner = match (change.owner.name, change.owner.account_id) {
            (Some(name), _) => name,
            (None, Some(id)) => id.to_string(),
            (None, None) => "?".to_string(),
        };
        Self {
            created: change.created.chars().take(keep).collect(),
            owner,
            subject: change.subject,
        }
    }
}

/// Search query for a project's open changes owned by a team
pub fn query(project: &str, team: &str) -> String {
    format!("project:{project} AND status:open AND ownerin:{team}")
}

/// Authenticated change search URL for a Gerrit host
pub fn query_url(host: &str, project: &str, team: &str) -> Result<Url, ProviderError> {
    let mut url = Url::parse(&format!("https://{}/a/changes/", host.trim_end_matches('/')))
        .map_err(|e| ProviderError::creation("gerrit_open_changes", e.to_string()))?;
    url.query_pairs_mut().append_pair("q", &query(project, team));
    Ok(url)
}

/// Decode a change list, dropping the XSSI guard line
pub fn parse_changes(body: &str) -> Result<Vec<ChangeRow>, ProviderError> {
    let json = body.strip_prefix(XSSI_PREFIX).unwrap_or(body);
    let changes: Vec<ChangeInfo> = serde_json::from_str(json)?;
    Ok(changes.into_iter().map(ChangeRow::from).collect())
}

/// Render rows as a bordered, left-aligned table sorted by creation time
pub fn render_table(rows: &[ChangeRow]) -> Content {
    let mut rows = rows.to_vec();
    rows.sort_by(|a, b| a.created.cmp(&b.created));

    let widths = [
        column_width(COLUMNS[0], rows.iter().map(|row| row.created.as_str())),
        column_width(COLUMNS[1], rows.iter().map(|row| row.owner.as_str())),
        column_width(COLUMNS[2], rows.iter().map(|row| row.subject.as_str())),
    ];

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: [&str; 3]| -> String {
        let cells: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!(" {cell:<width$} "))
            .collect();
        format!("|{}|", cells.join("|"))
    };

    let mut content = Content::empty();
    content.push(border.as_str());
    content.push(line(COLUMNS));
    content.push(border.as_str());
    for row in &rows {
        content.push(line([
            row.created.as_str(),
            row.owner.as_str(),
            row.subject.as_str(),
        ]));
    }
    content.push(border);
    content
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .chain([header.len()])
        .max()
        .unwrap_or(header.len())
}

/// HTTP basic credentials for the authenticated endpoint
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Configured values first, then `lookup` (the environment in production)
    pub fn resolve(
        user: Option<&str>,
        password: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ProviderError> {
        let pick = |configured: Option<&str>, env: &str| {
            configured
                .map(str::to_string)
                .or_else(|| lookup(env))
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    ProviderError::creation(
                        "gerrit_open_changes",
                        format!("missing credentials, set them in config or {env}"),
                    )
                })
        };
        Ok(Self {
            user: pick(user, USER_ENV)?,
            password: pick(password, PASSWORD_ENV)?,
        })
    }
}

/// Open changes of one project owned by one team
pub struct GerritOpenChangesProvider {
    url: Url,
    credentials: Credentials,
}

impl GerritOpenChangesProvider {
    pub fn new(
        host: &str,
        project: &str,
        team: &str,
        credentials: Credentials,
    ) -> Result<Self, ProviderError> {
        if host.trim().is_empty() || project.trim().is_empty() || team.trim().is_empty() {
            return Err(ProviderError::creation(
                "gerrit_open_changes",
                "url, project and team must be set",
            ));
        }
        Ok(Self {
            url: query_url(host, project, team)?,
            credentials,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn collect_rows(&self) -> Result<Vec<ChangeRow>, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {e}")))?;

        let response = client
            .get(self.url.clone())
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()?;
        if !response.status().is_success() {
            return Err(ProviderError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }
        parse_changes(&response.text()?)
    }
}

impl ContentProvider for GerritOpenChangesProvider {
    fn name(&self) -> &str {
        "gerrit_open_changes"
    }

    fn fetch(&self) -> Content {
        match self.collect_rows() {
            Ok(rows) => render_table(&rows),
            Err(e) => {
                debug!(provider = self.name(), url = %self.url, error = %e, "Gerrit query failed");
                Content::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            user: "bot".into(),
            password: "secret".into(),
        }
    }

    #[test]
    fn test_query_url() {
        let url = query_url("review.example.org", "radiator", "core-devs").unwrap();
        assert_eq!(url.host_str(), Some("review.example.org"));
        assert_eq!(url.path(), "/a/changes/");

        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "q");
        assert_eq!(
            value,
            "project:radiator AND status:open AND ownerin:core-devs"
        );
        assert!(url.as_str().contains("project%3Aradiator+AND+status%3Aopen"));
    }

    #[test]
    fn test_parse_changes_strips_guard() {
        let body = ")]}'\n[\
            {\"created\":\"2024-03-02 10:00:00.000000000\",\"owner\":{\"name\":\"Ada\"},\"subject\":\"Fix parser\"},\
            {\"created\":\"2024-03-01 09:41:37.123000000\",\"owner\":{\"_account_id\":1000096},\"subject\":\"Add clock\"}\
        ]";
        let rows = parse_changes(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].created, "2024-03-02 10:00:00.000");
        assert_eq!(rows[0].owner, "Ada");
        assert_eq!(rows[1].owner, "1000096");
    }

    #[test]
    fn test_render_table_sorted_by_created() {
        let rows = vec![
            ChangeRow {
                created: "2024-03-02 10:00:00.000".into(),
                owner: "Ada".into(),
                subject: "Fix parser".into(),
            },
            ChangeRow {
                created: "2024-03-01 09:41:37.123".into(),
                owner: "Grace".into(),
                subject: "Add clock".into(),
            },
        ];
        let texts = render_table(&rows).texts();

        // border, header, border, two rows, border
        assert_eq!(texts.len(), 6);
        assert!(texts[1].starts_with("| Created"));
        assert!(texts[3].contains("Grace"));
        assert!(texts[4].contains("Ada"));
        assert!(texts.iter().all(|line| line.chars().count() == texts[0].chars().count()));
    }

    #[test]
    fn test_empty_change_list_renders_header_only() {
        let texts = render_table(&parse_changes(")]}'\n[]").unwrap()).texts();
        assert_eq!(texts.len(), 4);
    }

    #[test]
    fn test_credentials_config_then_environment() {
        let env = |key: &str| match key {
            USER_ENV => Some("env-user".to_string()),
            PASSWORD_ENV => Some("env-pass".to_string()),
            _ => None,
        };
        let from_config = Credentials::resolve(Some("cfg-user"), None, env).unwrap();
        assert_eq!(from_config.user, "cfg-user");
        assert_eq!(from_config.password, "env-pass");
        assert!(!format!("{from_config:?}").contains("env-pass"));

        let err = Credentials::resolve(None, None, |_| None).unwrap_err();
        assert!(err.to_string().contains(USER_ENV));
    }

    #[test]
    fn test_blank_project_rejected() {
        assert!(GerritOpenChangesProvider::new("review.example.org", " ", "core", credentials())
            .is_err());
    }

    #[test]
    fn test_unreachable_server_gives_empty_content() {
        let provider =
            GerritOpenChangesProvider::new("127.0.0.1:9", "radiator", "core", credentials())
                .unwrap();
        assert!(provider.fetch().is_empty());
    }
}
