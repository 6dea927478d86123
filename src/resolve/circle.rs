//! Gaussian-weighted circle queries against a label grid.
//!
//! A query circle selects the pixels whose centers satisfy
//! `(x - cx)^2 + (y - cy)^2 <= r^2`. Every selected, labeled pixel votes for
//! its region with weight `exp(-d^2 / (2 sigma^2))`, where `d` is its
//! distance to the circle center and `sigma = max(sigma_scale * r, 0.75)`.
//! Votes therefore fall off away from the tap point instead of treating the
//! whole circle uniformly.
//!
//! Only the bounding box of the circle is scanned. Pixels outside the circle
//! never contribute, so this gives the same result as a full-grid pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::raster::{BACKGROUND, LabelGrid};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Lower bound on the Gaussian standard deviation, in pixels.
pub const MIN_SIGMA: f64 = 0.75;

/// A query circle in pixel coordinates of the label grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryCircle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl QueryCircle {
    #[must_use]
    pub const fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self { cx, cy, radius }
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.cx;
        let dy = y - self.cy;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Tuning knobs for [`resolve_circle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveParams {
    /// Maximum number of regions returned.
    pub k: usize,
    /// Regions with fewer in-circle pixels are dropped.
    pub min_pixels: usize,
    /// Gaussian sigma as a fraction of the radius.
    pub sigma_scale: f64,
}

impl Default for ResolveParams {
    fn default() -> Self {
        Self {
            k: 5,
            min_pixels: 3,
            sigma_scale: 0.25,
        }
    }
}

/// One region's share of a circle query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredRegion {
    pub region_id: u16,
    /// Unnormalized Gaussian mass over the region's in-circle pixels.
    pub weight: f64,
    /// Raw number of in-circle pixels carrying this region's label.
    pub pixel_count: usize,
}

/// Gaussian standard deviation used for a circle of `radius` pixels.
#[must_use]
pub fn gaussian_sigma(radius: f64, sigma_scale: f64) -> f64 {
    (sigma_scale * radius).max(MIN_SIGMA)
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    pixels: usize,
    weight: f64,
}

type RowTally = BTreeMap<u16, Tally>;

/// Ranks the regions intersecting `circle` by Gaussian-weighted area.
///
/// Returns at most `params.k` regions, heaviest first. Equal weights keep
/// ascending id order. The result is empty when the circle covers no pixel
/// or only background.
#[must_use]
pub fn resolve_circle(
    grid: &LabelGrid,
    circle: QueryCircle,
    params: &ResolveParams,
) -> Vec<ScoredRegion> {
    let Some((xs, ys)) = scan_window(grid, circle) else {
        return Vec::new();
    };

    let sigma = gaussian_sigma(circle.radius, params.sigma_scale);
    let two_sigma_sq = 2.0 * sigma * sigma;
    let scan_row = |y: usize| row_tally(grid, y, xs, circle, two_sigma_sq);

    // Row partials are merged in row order so both paths sum identically.
    #[cfg(feature = "parallel")]
    let rows: Vec<Option<RowTally>> = (ys.0..=ys.1).into_par_iter().map(scan_row).collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Option<RowTally>> = (ys.0..=ys.1).map(scan_row).collect();

    let mut covered_any = false;
    let mut totals = RowTally::new();
    for row in rows.into_iter().flatten() {
        covered_any = true;
        for (id, tally) in row {
            let entry = totals.entry(id).or_default();
            entry.pixels += tally.pixels;
            entry.weight += tally.weight;
        }
    }
    if !covered_any {
        return Vec::new();
    }

    let mut scored: Vec<ScoredRegion> = totals
        .into_iter()
        .filter(|(_, tally)| tally.pixels >= params.min_pixels && tally.weight > 0.0)
        .map(|(region_id, tally)| ScoredRegion {
            region_id,
            weight: tally.weight,
            pixel_count: tally.pixels,
        })
        .collect();

    scored.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    scored.truncate(params.k);
    scored
}

/// Inclusive pixel ranges that can hold in-circle pixels, padded by one
/// pixel so rounding in the bounds never drops an edge pixel.
fn scan_window(grid: &LabelGrid, circle: QueryCircle) -> Option<((usize, usize), (usize, usize))> {
    let QueryCircle { cx, cy, radius } = circle;
    if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) || radius < 0.0 {
        return None;
    }
    let xs = axis_range(cx, radius, grid.width())?;
    let ys = axis_range(cy, radius, grid.height())?;
    Some((xs, ys))
}

fn axis_range(center: f64, radius: f64, extent: usize) -> Option<(usize, usize)> {
    if extent == 0 {
        return None;
    }
    let last = (extent - 1) as f64;
    let lo = (center - radius).floor() - 1.0;
    let hi = (center + radius).ceil() + 1.0;
    if hi < 0.0 || lo > last {
        return None;
    }
    Some((lo.max(0.0) as usize, hi.min(last) as usize))
}

/// Tallies one row. `None` means no pixel of the row lies in the circle.
fn row_tally(
    grid: &LabelGrid,
    y: usize,
    xs: (usize, usize),
    circle: QueryCircle,
    two_sigma_sq: f64,
) -> Option<RowTally> {
    let labels = grid.row(y);
    let fy = y as f64;
    let mut in_circle = false;
    let mut tally = RowTally::new();

    for x in xs.0..=xs.1 {
        let fx = x as f64;
        if !circle.contains(fx, fy) {
            continue;
        }
        in_circle = true;
        let label = labels[x];
        if label == BACKGROUND {
            continue;
        }
        let dx = fx - circle.cx;
        let dy = fy - circle.cy;
        let entry = tally.entry(label).or_default();
        entry.pixels += 1;
        entry.weight += (-(dx * dx + dy * dy) / two_sigma_sq).exp();
    }

    in_circle.then_some(tally)
}
