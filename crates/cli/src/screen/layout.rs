//! Panel regions from an `H+L+R+F` screen layout.

use contracts::ScreenLayout;

/// Rectangle of terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrink by `margin` cells on every side
    pub fn inset(self, margin: u16) -> Self {
        let width = self.width.saturating_sub(margin.saturating_mul(2));
        let height = self.height.saturating_sub(margin.saturating_mul(2));
        Self {
            x: self.x.saturating_add(margin),
            y: self.y.saturating_add(margin),
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Split `len` cells starting at `start` into `parts` contiguous slices
fn split(start: u16, len: u16, parts: u8) -> Vec<(u16, u16)> {
    let parts = u32::from(parts);
    let len32 = u32::from(len);
    (0..parts)
        .map(|i| {
            let from = len32 * i / parts;
            let to = len32 * (i + 1) / parts;
            // from/to never exceed len, which fits in u16
            (start + from as u16, (to - from) as u16)
        })
        .collect()
}

/// Regions for every surface, numbered header, middle-left, middle-right, footer
///
/// The middle band is as tall as `max(left, right)` rows. When one side of
/// the middle band has no rows the other side spans the full width.
pub fn compute_regions(layout: &ScreenLayout, area: Region, margin: u16) -> Vec<Region> {
    let middle = layout.left.max(layout.right);
    let bands = layout.header + middle + layout.footer;
    if bands == 0 {
        return Vec::new();
    }

    let rows = split(area.y, area.height, bands);
    let full_row = |(y, height): (u16, u16)| Region::new(area.x, y, area.width, height);

    let mut regions = Vec::with_capacity(layout.total_rows());
    regions.extend(rows[..usize::from(layout.header)].iter().copied().map(full_row));

    if middle > 0 {
        let first = rows[usize::from(layout.header)];
        let last = rows[usize::from(layout.header + middle) - 1];
        let top = first.0;
        let height = last.0 + last.1 - top;

        let (left_area, right_area) = match (layout.left, layout.right) {
            (_, 0) => (Region::new(area.x, top, area.width, height), Region::default()),
            (0, _) => (Region::default(), Region::new(area.x, top, area.width, height)),
            _ => {
                let half = area.width / 2;
                (
                    Region::new(area.x, top, half, height),
                    Region::new(area.x + half, top, area.width - half, height),
                )
            }
        };

        for (side, count) in [(left_area, layout.left), (right_area, layout.right)] {
            regions.extend(
                split(side.y, side.height, count)
                    .into_iter()
                    .map(|(y, height)| Region::new(side.x, y, side.width, height)),
            );
        }
    }

    regions.extend(
        rows[usize::from(layout.header + middle)..]
            .iter()
            .copied()
            .map(full_row),
    );

    regions.into_iter().map(|r| r.inset(margin)).collect()
}
