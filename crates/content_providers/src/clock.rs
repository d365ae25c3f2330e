//! Local wall clock

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use contracts::{Content, ContentProvider};

use crate::error::ProviderError;

pub const DEFAULT_FORMAT: &str = "%A, %d %B %Y\n%H:%M:%S";

/// Current local time, one line per `\n` in the format
pub struct ClockProvider {
    format: String,
}

impl ClockProvider {
    /// Reject strftime patterns chrono cannot render
    pub fn new(format: Option<String>) -> Result<Self, ProviderError> {
        let format = format.unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ProviderError::creation(
                "clock",
                format!("invalid time format '{format}'"),
            ));
        }
        Ok(Self { format })
    }
}

impl ContentProvider for ClockProvider {
    fn name(&self) -> &str {
        "clock"
    }

    fn fetch(&self) -> Content {
        let now = Local::now().format(&self.format).to_string();
        Content::from_plain(now.lines())
    }
}
