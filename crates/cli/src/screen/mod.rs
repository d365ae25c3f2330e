//! Terminal screen: a title row above the panels of the configured layout.
//!
//! Frames are composed into a cell grid and written with ANSI escapes
//! (cursor home, 24-bit colours), so stdout must be a truecolor terminal.

mod layout;
mod panel;

pub use layout::{compute_regions, Region};
pub use panel::{Panel, PanelBuffer};

use std::io::{self, Write};

use contracts::{DisplayConfig, Line, Rgb};

/// Loading banner shown while channels start
const LOADING: [(char, Rgb); 10] = [
    ('L', Rgb(0, 121, 234)),
    ('O', Rgb(23, 132, 234)),
    ('A', Rgb(47, 144, 234)),
    ('D', Rgb(70, 155, 234)),
    ('I', Rgb(94, 166, 234)),
    ('N', Rgb(117, 178, 234)),
    ('G', Rgb(140, 189, 234)),
    ('.', Rgb(164, 200, 234)),
    ('.', Rgb(187, 211, 234)),
    ('.', Rgb(211, 223, 234)),
];

const BACKGROUND: Rgb = Rgb::BLACK;

/// One terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::WHITE,
            bg: BACKGROUND,
        }
    }
}

/// A composed frame
#[derive(Debug, Clone)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    fn blank(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get_mut(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Text of one row, colours dropped
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.cell(x, y))
            .map(|c| c.ch)
            .collect()
    }

    fn fill(&mut self, region: Region, bg: Rgb) {
        for y in region.y..region.y.saturating_add(region.height) {
            for x in region.x..region.x.saturating_add(region.width) {
                if let Some(cell) = self.cell_mut(x, y) {
                    *cell = Cell { bg, ..Cell::default() };
                }
            }
        }
    }

    /// Draw `line` at the start of a row, clipped to `width` cells
    fn put_line(&mut self, x: u16, y: u16, width: u16, line: &Line, default_fg: Rgb) {
        let chars = line.spans.iter().flat_map(|span| {
            // Spans left at the default colour take the configured foreground
            let fg = if span.color == Rgb::default() {
                default_fg
            } else {
                span.color
            };
            span.text.chars().map(move |ch| (ch, fg))
        });

        for (offset, (ch, fg)) in (0..width).zip(chars) {
            if let Some(cell) = self.cell_mut(x + offset, y) {
                cell.ch = if ch.is_control() { ' ' } else { ch };
                cell.fg = fg;
            }
        }
    }

    /// Write the frame with ANSI escapes, starting at the cursor home position
    pub fn write_ansi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "\x1b[H")?;
        let mut current: Option<(Rgb, Rgb)> = None;
        for y in 0..self.height {
            if y > 0 {
                write!(out, "\r\n")?;
            }
            for x in 0..self.width {
                let Some(cell) = self.cell(x, y) else {
                    continue;
                };
                if current != Some((cell.fg, cell.bg)) {
                    let Rgb(fr, fg, fb) = cell.fg;
                    let Rgb(br, bg, bb) = cell.bg;
                    write!(out, "\x1b[38;2;{fr};{fg};{fb}m\x1b[48;2;{br};{bg};{bb}m")?;
                    current = Some((cell.fg, cell.bg));
                }
                write!(out, "{}", cell.ch)?;
            }
        }
        write!(out, "\x1b[0m")
    }
}

/// The dashboard screen
#[derive(Debug)]
pub struct Screen {
    title: String,
    width: u16,
    height: u16,
    foreground: Rgb,
    panels: Vec<Panel>,
}

impl Screen {
    /// Screen with one panel per layout surface, below a one-row title bar
    pub fn new(display: &DisplayConfig) -> Self {
        let area = Region::new(0, 1, display.width, display.height.saturating_sub(1));
        let panels = compute_regions(&display.layout, area, display.margin)
            .into_iter()
            .enumerate()
            .map(|(surface, region)| Panel::new(surface, region))
            .collect();

        Self {
            title: display.title.clone(),
            width: display.width,
            height: display.height,
            foreground: display.foreground.rgb(),
            panels,
        }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, surface: usize) -> Option<&Panel> {
        self.panels.get(surface)
    }

    /// Compose title and panels into a frame
    pub fn compose(&self) -> Frame {
        let mut frame = Frame::blank(self.width, self.height);
        frame.put_line(0, 0, self.width, &Line::plain(self.title.as_str()), self.foreground);

        for panel in &self.panels {
            let region = panel.region();
            if region.is_empty() {
                continue;
            }
            let buffer = panel.snapshot();
            if let Some(bg) = buffer.background {
                frame.fill(region, bg);
            }
            for (row, line) in (0..region.height).zip(&buffer.lines) {
                frame.put_line(region.x, region.y + row, region.width, line, self.foreground);
            }
        }
        frame
    }

    /// Frame with the centred loading banner and nothing else
    pub fn loading_frame(&self) -> Frame {
        let mut frame = Frame::blank(self.width, self.height);
        let len = LOADING.len() as u16;
        let x = self.width.saturating_sub(len) / 2;
        let y = self.height / 2;
        for (offset, (ch, fg)) in (0..len).zip(LOADING) {
            if let Some(cell) = frame.cell_mut(x + offset, y) {
                cell.ch = ch;
                cell.fg = fg;
            }
        }
        frame
    }

    /// Hide the cursor, clear the terminal and set the window title
    pub fn enter<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "\x1b]0;{}\x07\x1b[?25l\x1b[2J", self.title)?;
        out.flush()
    }

    pub fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.compose().write_ansi(out)?;
        out.flush()
    }

    pub fn draw_loading<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.loading_frame().write_ansi(out)?;
        out.flush()
    }

    /// Restore the cursor below the last frame
    pub fn leave<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "\x1b[0m\x1b[{};1H\x1b[?25h\r\n", self.height)?;
        out.flush()
    }
}
