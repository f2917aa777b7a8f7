//! First-fit, row-major bin packing of items onto paginated grids.
//!
//! Items are placed strictly in input order, so the order of the desktop list is the visual
//! reading order: left to right, top to bottom, page by page.

use crate::model::{DesktopItem, Footprint, ItemId};

/// Hard cap on pages; items that would need more are dropped.
pub const MAX_PAGES: u32 = 20;
/// Largest column or row count a page grid is built with; larger requests are clamped.
pub const MAX_GRID_SPAN: u32 = 256;

/// What the packer needs to know about an item.
pub trait Placeable {
    fn item_id(&self) -> ItemId;
    fn footprint(&self) -> Footprint;
}

impl Placeable for DesktopItem {
    fn item_id(&self) -> ItemId {
        self.id
    }

    fn footprint(&self) -> Footprint {
        self.footprint
    }
}

/// An item with its computed placement. `w`/`h` are the effective spans after clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedItem<T = DesktopItem> {
    pub item: T,
    pub x: u32,
    pub y: u32,
    pub page: u32,
    pub w: u32,
    pub h: u32,
}

impl<T> PackedItem<T> {
    pub fn covers(&self, col: u32, row: u32) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }
}

struct PageGrid {
    cols: u32,
    rows: u32,
    occupied: Vec<bool>,
}

impl PageGrid {
    fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            occupied: vec![false; cols as usize * rows as usize],
        }
    }

    fn fits(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        if x + w > self.cols || y + h > self.rows {
            return false;
        }
        (y..y + h).all(|row| (x..x + w).all(|col| !self.occupied[(row * self.cols + col) as usize]))
    }

    fn occupy(&mut self, x: u32, y: u32, w: u32, h: u32) {
        for row in y..y + h {
            for col in x..x + w {
                self.occupied[(row * self.cols + col) as usize] = true;
            }
        }
    }

    fn first_fit(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| (x, y)))
            .find(|&(x, y)| self.fits(x, y, w, h))
    }
}

/// Assigns every item an `(x, y, page)` placement on a `cols` x `rows` grid.
///
/// Footprints are clamped into the grid, so an oversized widget shrinks rather than failing.
/// A zero-sized grid places nothing.
pub fn pack<T: Placeable + Clone>(items: &[T], cols: u32, rows: u32) -> Vec<PackedItem<T>> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    if cols > MAX_GRID_SPAN || rows > MAX_GRID_SPAN {
        leptos::logging::warn!("clamping {cols}x{rows} packing grid to {MAX_GRID_SPAN} per side");
    }
    let (cols, rows) = (cols.min(MAX_GRID_SPAN), rows.min(MAX_GRID_SPAN));

    let mut pages: Vec<PageGrid> = Vec::new();
    let mut packed = Vec::with_capacity(items.len());
    let mut dropped = 0usize;

    for item in items {
        let (w, h) = item.footprint().cells();
        let (w, h) = (w.min(cols), h.min(rows));

        let mut page = 0u32;
        loop {
            if page >= MAX_PAGES {
                dropped += 1;
                break;
            }
            if pages.len() <= page as usize {
                pages.push(PageGrid::new(cols, rows));
            }
            let grid = &mut pages[page as usize];
            if let Some((x, y)) = grid.first_fit(w, h) {
                grid.occupy(x, y, w, h);
                packed.push(PackedItem {
                    item: item.clone(),
                    x,
                    y,
                    page,
                    w,
                    h,
                });
                break;
            }
            page += 1;
        }
    }

    if dropped > 0 {
        leptos::logging::warn!(
            "layout packing dropped {dropped} item(s) beyond the {MAX_PAGES}-page cap ({cols}x{rows} grid)"
        );
    }
    packed
}

/// Number of pages a packed layout spans; never less than one.
pub fn page_count<T>(packed: &[PackedItem<T>]) -> u32 {
    packed
        .iter()
        .map(|placed| placed.page + 1)
        .max()
        .unwrap_or(1)
}
