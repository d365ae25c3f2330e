//! Built-in shell providers: top, w, finger, the_cow

use contracts::{CommandSpec, Content, ContentProvider, Line, Rgb, Span};
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::command::{execute_compound, execute_simple, lines_or_empty};
use crate::error::ProviderError;

/// cowsay face flags picked at random per fetch
pub const COW_FACES: [&str; 8] = ["-b", "-d", "-g", "-p", "-s", "-t", "-w", "-y"];

/// Thread view of the process that launched the radiator
pub struct TopProvider {
    spec: CommandSpec,
}

impl TopProvider {
    pub fn new() -> Self {
        let parent = std::os::unix::process::parent_id().to_string();
        Self {
            spec: CommandSpec::new("top", ["-H", "-b", "-n1", "-p", parent.as_str()]),
        }
    }
}

impl Default for TopProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentProvider for TopProvider {
    fn name(&self) -> &str {
        "top"
    }

    fn fetch(&self) -> Content {
        lines_or_empty(self.name(), execute_simple(&self.spec))
    }
}

/// Logged-in users (`w -s`)
pub struct WProvider {
    spec: CommandSpec,
}

impl WProvider {
    pub fn new() -> Self {
        Self {
            spec: CommandSpec::new("w", ["-s"]),
        }
    }
}

impl Default for WProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentProvider for WProvider {
    fn name(&self) -> &str {
        "w"
    }

    fn fetch(&self) -> Content {
        lines_or_empty(self.name(), execute_simple(&self.spec))
    }
}

/// `finger <login>` with the login name highlighted in red
pub struct FingerProvider {
    login_name: String,
    spec: CommandSpec,
}

impl FingerProvider {
    /// Use the given login, or the current user from the environment
    pub fn new(login_name: Option<String>) -> Result<Self, ProviderError> {
        let login_name = login_name
            .filter(|name| !name.trim().is_empty())
            .or_else(current_login)
            .ok_or_else(|| {
                ProviderError::creation("finger", "no login_name given and $USER is not set")
            })?;

        Ok(Self {
            spec: CommandSpec::new("finger", [login_name.as_str()]),
            login_name,
        })
    }

    pub fn login_name(&self) -> &str {
        &self.login_name
    }
}

impl ContentProvider for FingerProvider {
    fn name(&self) -> &str {
        "finger"
    }

    fn fetch(&self) -> Content {
        match execute_simple(&self.spec) {
            Ok(lines) => lines
                .iter()
                .map(|line| highlight(line, &self.login_name, Rgb::RED))
                .collect(),
            Err(e) => {
                debug!(provider = self.name(), error = %e, "Fetch failed, returning empty content");
                Content::empty()
            }
        }
    }
}

fn current_login() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.is_empty())
}

/// Split `line` so every occurrence of `needle` gets its own coloured span
pub fn highlight(line: &str, needle: &str, color: Rgb) -> Line {
    if needle.is_empty() {
        return Line::plain(line);
    }

    let mut spans = Vec::new();
    let mut rest = 0;
    for (start, matched) in line.match_indices(needle) {
        if start > rest {
            spans.push(Span::plain(&line[rest..start]));
        }
        spans.push(Span::colored(matched, color));
        rest = start + matched.len();
    }
    if rest < line.len() || spans.is_empty() {
        spans.push(Span::plain(&line[rest..]));
    }
    Line::new(spans)
}

/// `fortune -s | cowsay <random face>`
pub struct TheCowProvider {
    fortune: CommandSpec,
}

impl TheCowProvider {
    pub fn new() -> Self {
        Self {
            fortune: CommandSpec::new("fortune", ["-s"]),
        }
    }

    fn cowsay() -> CommandSpec {
        let face = COW_FACES.choose(&mut rand::rng()).copied().unwrap_or("-b");
        CommandSpec::new("cowsay", [face])
    }
}

impl Default for TheCowProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentProvider for TheCowProvider {
    fn name(&self) -> &str {
        "the_cow"
    }

    fn fetch(&self) -> Content {
        lines_or_empty(self.name(), execute_compound(&self.fortune, &Self::cowsay()))
    }
}
