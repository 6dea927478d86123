//! Rasterization of the region catalog into dense per-pixel label grids.
//!
//! A [`LabelGrid`] stores, for every pixel of a fixed-size canvas, the id of
//! the region painted there (or `0` for background). Regions are painted in
//! catalog order, so a later region overwrites an earlier one where their
//! boxes overlap.

mod cache;

pub use cache::{LabelGridCache, LabelGridCacheStats};

use serde::{Deserialize, Serialize};

use crate::catalog::{NormBox, RegionDef};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Label value of pixels not covered by any region.
pub const BACKGROUND: u16 = 0;

/// Fixed raster resolution shared by rasterization and query scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    pub width: usize,
    pub height: usize,
}

impl GridDims {
    /// Resolution the built-in catalog was tuned for.
    pub const DEFAULT: Self = Self::new(800, 1200);

    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width * self.height
    }

    /// The smaller of the two extents; radii are scaled against it.
    #[must_use]
    pub const fn min_extent(self) -> usize {
        if self.width < self.height {
            self.width
        } else {
            self.height
        }
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelRect {
    /// Converts a normalized box to pixel space by flooring each corner and
    /// clamping to the canvas. Returns `None` when nothing is left.
    #[must_use]
    pub fn from_norm(bounds: NormBox, dims: GridDims) -> Option<Self> {
        let rect = Self {
            x0: to_pixel(bounds.x1, dims.width),
            y0: to_pixel(bounds.y1, dims.height),
            x1: to_pixel(bounds.x2, dims.width),
            y1: to_pixel(bounds.y2, dims.height),
        };
        (rect.x1 > rect.x0 && rect.y1 > rect.y0).then_some(rect)
    }

    #[must_use]
    pub const fn contains_row(&self, y: usize) -> bool {
        y >= self.y0 && y < self.y1
    }

    #[must_use]
    pub const fn area(&self) -> usize {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

fn to_pixel(value: f64, extent: usize) -> usize {
    let extent = extent as f64;
    // NaN saturates to 0 in the cast.
    (value * extent).floor().clamp(0.0, extent) as usize
}

/// Dense row-major label raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    dims: GridDims,
    cells: Vec<u16>,
}

impl LabelGrid {
    /// An all-background grid.
    #[must_use]
    pub fn empty(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![BACKGROUND; dims.cell_count()],
        }
    }

    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.dims.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.dims.height
    }

    /// Label at pixel `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        self.cells.get(y * self.dims.width + x).copied()
    }

    /// One row of labels. Panics if `y` is out of range.
    #[must_use]
    pub fn row(&self, y: usize) -> &[u16] {
        let start = y * self.dims.width;
        &self.cells[start..start + self.dims.width]
    }

    /// Number of pixels carrying `id`.
    #[must_use]
    pub fn count_label(&self, id: u16) -> usize {
        self.cells.iter().filter(|&&cell| cell == id).count()
    }

    /// Bytes held by the cell buffer.
    #[must_use]
    pub fn memory_bytes(&self) -> usize {
        self.cells.len() * std::mem::size_of::<u16>()
    }
}

/// Paints `regions` onto a fresh grid, later regions winning on overlap.
///
/// Boxes that collapse to zero pixels after flooring are skipped.
#[must_use]
pub fn rasterize(regions: &[RegionDef], dims: GridDims) -> LabelGrid {
    let rects: Vec<(u16, PixelRect)> = regions
        .iter()
        .filter_map(|def| PixelRect::from_norm(def.bounds, dims).map(|rect| (def.id, rect)))
        .collect();

    let mut grid = LabelGrid::empty(dims);
    if dims.width == 0 {
        return grid;
    }

    let paint_row = |(y, row): (usize, &mut [u16])| {
        for (id, rect) in &rects {
            if rect.contains_row(y) {
                row[rect.x0..rect.x1].fill(*id);
            }
        }
    };

    #[cfg(feature = "parallel")]
    grid.cells
        .par_chunks_mut(dims.width)
        .enumerate()
        .for_each(paint_row);

    #[cfg(not(feature = "parallel"))]
    grid.cells
        .chunks_mut(dims.width)
        .enumerate()
        .for_each(paint_row);

    log::debug!(
        "rasterized {} of {} regions onto {}x{} grid",
        rects.len(),
        regions.len(),
        dims.width,
        dims.height
    );

    grid
}
