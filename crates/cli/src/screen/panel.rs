//! Panel - the shared text buffer behind one screen surface.
//!
//! Channels write into a panel from their consumer task (render) or from
//! the main loop (static noise); the screen reads it when composing a frame.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use channel::StaticHook;
use contracts::{Content, Line, RenderFunction, Rgb, Span};
use rand::Rng;

use super::layout::Region;

/// Characters used for the no-signal noise
const NOISE: &[char] = &[' ', ' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Current contents of a panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelBuffer {
    pub lines: Vec<Line>,
    /// Fill colour; `None` keeps the screen background
    pub background: Option<Rgb>,
}

/// One screen surface
#[derive(Debug, Clone)]
pub struct Panel {
    surface: usize,
    region: Region,
    buffer: Arc<Mutex<PanelBuffer>>,
}

fn lock(buffer: &Mutex<PanelBuffer>) -> MutexGuard<'_, PanelBuffer> {
    // A panicking render only leaves stale lines behind
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Panel {
    pub fn new(surface: usize, region: Region) -> Self {
        Self {
            surface,
            region,
            buffer: Arc::new(Mutex::new(PanelBuffer::default())),
        }
    }

    pub fn surface(&self) -> usize {
        self.surface
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Copy of the current buffer
    pub fn snapshot(&self) -> PanelBuffer {
        lock(&self.buffer).clone()
    }

    /// Replace the panel contents with rendered content
    pub fn show(&self, content: &Content) {
        let mut buffer = lock(&self.buffer);
        buffer.lines = content.lines().to_vec();
        buffer.background = None;
    }

    /// Fill the panel with random noise
    pub fn show_static(&self, foreground: Rgb, background: Rgb) {
        self.show_static_while(foreground, background, &|| true);
    }

    /// Fill the panel with noise unless `no_signal` turns false under the lock
    ///
    /// Returns whether the noise was drawn.
    pub fn show_static_while(
        &self,
        foreground: Rgb,
        background: Rgb,
        no_signal: &dyn Fn() -> bool,
    ) -> bool {
        let lines = static_noise(self.region.width, self.region.height, foreground);
        let mut buffer = lock(&self.buffer);
        if !no_signal() {
            return false;
        }
        buffer.lines = lines;
        buffer.background = Some(background);
        true
    }

    /// Render callable handed to the channel bound to this surface
    pub fn render_function(&self) -> RenderFunction {
        let panel = self.clone();
        Arc::new(move |content: &Content| panel.show(content))
    }

    /// Placeholder drawer handed to the channel bound to this surface
    pub fn static_hook(&self, foreground: Rgb, background: Rgb) -> StaticHook {
        let panel = self.clone();
        Arc::new(move |no_signal: &dyn Fn() -> bool| {
            panel.show_static_while(foreground, background, no_signal);
        })
    }
}

fn static_noise(width: u16, height: u16, color: Rgb) -> Vec<Line> {
    let mut rng = rand::rng();
    (0..height)
        .map(|_| {
            let text: String = (0..width)
                .map(|_| NOISE[rng.random_range(0..NOISE.len())])
                .collect();
            Line::new(vec![Span::colored(text, color)])
        })
        .collect()
}
