//! Grid geometry derived from the viewport size.

use serde::{Deserialize, Serialize};

/// Widths below each breakpoint use the paired column count; wider viewports use
/// [`WIDE_COLUMNS`].
pub const COLUMN_BREAKPOINTS: [(f64, u32); 3] = [(640.0, 3), (768.0, 4), (1280.0, 6)];
pub const WIDE_COLUMNS: u32 = 8;
pub const MOBILE_MAX_WIDTH: f64 = 640.0;
/// Vertical space reserved above the grid (clock, search bar).
pub const TOP_CHROME_PX: f64 = 380.0;
pub const BOTTOM_CHROME_WITH_DOCK_PX: f64 = 200.0;
pub const BOTTOM_CHROME_WITHOUT_DOCK_PX: f64 = 60.0;
pub const ROW_HEIGHT_PX: f64 = 110.0;
pub const MAX_ROWS: u32 = 4;
pub const GRID_WIDTH_RATIO: f64 = 0.92;
pub const GRID_MAX_WIDTH_PX: f64 = 1200.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub cols: u32,
    pub rows: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    pub grid_pixel_width: f64,
    pub is_mobile: bool,
}

impl GridGeometry {
    pub fn compute(viewport: Viewport, dock_visible: bool) -> Self {
        let width = sanitize(viewport.width);
        let height = sanitize(viewport.height);

        let cols = COLUMN_BREAKPOINTS
            .iter()
            .find(|(max_width, _)| width < *max_width)
            .map_or(WIDE_COLUMNS, |(_, cols)| *cols);

        let bottom_chrome = if dock_visible {
            BOTTOM_CHROME_WITH_DOCK_PX
        } else {
            BOTTOM_CHROME_WITHOUT_DOCK_PX
        };
        let available = (height - TOP_CHROME_PX - bottom_chrome).max(0.0);
        let rows = ((available / ROW_HEIGHT_PX).floor() as u32).clamp(1, MAX_ROWS);

        let grid_pixel_width = (width * GRID_WIDTH_RATIO).min(GRID_MAX_WIDTH_PX);
        Self {
            cols,
            rows,
            cell_width: grid_pixel_width / cols as f64,
            cell_height: ROW_HEIGHT_PX,
            grid_pixel_width,
            is_mobile: width < MOBILE_MAX_WIDTH,
        }
    }

    /// Whether cells have a usable pixel size. Hit testing is skipped until they do.
    pub fn is_measured(&self) -> bool {
        self.cell_width > 0.0 && self.cell_height > 0.0
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::compute(Viewport::default(), true)
    }
}

fn sanitize(px: f64) -> f64 {
    if px.is_finite() {
        px.max(0.0)
    } else {
        0.0
    }
}
