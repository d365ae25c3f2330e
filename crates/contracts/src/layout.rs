//! Screen layout - how many panel rows each screen band holds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Screen layout in the `H+L+R+F` notation
///
/// Header and footer rows span the full width, middle-left and middle-right
/// rows split it in half. Surfaces are numbered header, left, right, footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScreenLayout {
    pub header: u8,
    pub left: u8,
    pub right: u8,
    pub footer: u8,
}

impl ScreenLayout {
    pub fn new(header: u8, left: u8, right: u8, footer: u8) -> Self {
        Self {
            header,
            left,
            right,
            footer,
        }
    }

    /// Total number of panels (surfaces) on screen
    pub fn total_rows(&self) -> usize {
        usize::from(self.header)
            + usize::from(self.left)
            + usize::from(self.right)
            + usize::from(self.footer)
    }
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self::new(0, 2, 2, 0)
    }
}

impl FromStr for ScreenLayout {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ContractError::InvalidScreenLayout {
            layout: s.to_string(),
        };

        let parts: Vec<&str> = s.trim().split('+').collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut rows = [0u8; 4];
        for (slot, part) in rows.iter_mut().zip(&parts) {
            if part.len() != 1 {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(rows[0], rows[1], rows[2], rows[3]))
    }
}

impl TryFrom<String> for ScreenLayout {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScreenLayout> for String {
    fn from(layout: ScreenLayout) -> Self {
        layout.to_string()
    }
}

impl fmt::Display for ScreenLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}+{}+{}+{}",
            self.header, self.left, self.right, self.footer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_layout() {
        let layout: ScreenLayout = "0+2+2+0".parse().unwrap();
        assert_eq!(layout, ScreenLayout::default());
        assert_eq!(layout.total_rows(), 4);
        assert_eq!(layout.to_string(), "0+2+2+0");
    }

    #[test]
    fn rejects_malformed_layouts() {
        for bad in ["", "1+2+3", "1+2+3+4+5", "a+1+1+1", "10+1+1+1", "1-1-1-1"] {
            assert!(bad.parse::<ScreenLayout>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn zero_layout_parses_but_has_no_rows() {
        let layout: ScreenLayout = "0+0+0+0".parse().unwrap();
        assert_eq!(layout.total_rows(), 0);
    }

    #[test]
    fn serde_uses_string_form() {
        let layout: ScreenLayout = serde_json::from_str("\"1+1+1+1\"").unwrap();
        assert_eq!(layout.total_rows(), 4);
        assert_eq!(serde_json::to_string(&layout).unwrap(), "\"1+1+1+1\"");
        assert!(serde_json::from_str::<ScreenLayout>("\"x\"").is_err());
    }
}
