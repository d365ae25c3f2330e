//! Content - FetchFunction output, RenderFunction input
//!
//! A fetched result is a list of lines, each line a list of coloured spans.

use serde::{Deserialize, Serialize};

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const GRAY: Rgb = Rgb(180, 180, 180);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Colours accepted by name in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Blue,
    Gray,
    Green,
    Red,
    White,
    Yellow,
}

impl NamedColor {
    /// All named colours, in configuration order
    pub const ALL: [NamedColor; 7] = [
        NamedColor::Black,
        NamedColor::Blue,
        NamedColor::Gray,
        NamedColor::Green,
        NamedColor::Red,
        NamedColor::White,
        NamedColor::Yellow,
    ];

    pub fn rgb(self) -> Rgb {
        match self {
            NamedColor::Black => Rgb::BLACK,
            NamedColor::Blue => Rgb::BLUE,
            NamedColor::Gray => Rgb::GRAY,
            NamedColor::Green => Rgb::GREEN,
            NamedColor::Red => Rgb::RED,
            NamedColor::White => Rgb::WHITE,
            NamedColor::Yellow => Rgb::YELLOW,
        }
    }
}

impl From<NamedColor> for Rgb {
    fn from(color: NamedColor) -> Self {
        color.rgb()
    }
}

/// A run of text drawn in one colour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(default)]
    pub color: Rgb,
}

impl Span {
    /// Span in the default (white) colour
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Rgb::default(),
        }
    }

    pub fn colored(text: impl Into<String>, color: Rgb) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// One rendered row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Line made of a single white span
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::plain(text)],
        }
    }

    /// Concatenated text of every span, colours dropped
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Number of characters across all spans
    pub fn char_len(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::plain(text)
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Line::plain(text)
    }
}

/// Result of one fetch
///
/// Empty content is the "falsy" result: no data available this cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    lines: Vec<Line>,
}

impl Content {
    /// Content with no lines
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Build from plain text lines
    pub fn from_plain<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(|l| Line::plain(l)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn push(&mut self, line: impl Into<Line>) {
        self.lines.push(line.into());
    }

    /// Plain text of every line, colours dropped
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }
}

impl FromIterator<Line> for Content {
    fn from_iter<T: IntoIterator<Item = Line>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}
