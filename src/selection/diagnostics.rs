//! Diagnostic record attached to a selection outcome.

use serde::Serialize;

use crate::catalog::BodySide;

/// What the resolver actually computed for one call.
///
/// Pixel values are rounded to 2 decimals. They are reported after
/// clamping, so they always lie on the grid even for wild input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionDiagnostics {
    pub side: BodySide,

    /// Circle center on the label grid, in pixels.
    pub cx_px: f64,
    pub cy_px: f64,
    pub radius_px: f64,

    /// Standard deviation of the Gaussian vote, in pixels.
    pub sigma_px: f64,

    pub grid_width: usize,
    pub grid_height: usize,

    /// Number of regions that survived the circle scan (before fallback).
    pub raw_count: usize,

    /// `true` when the ranking came from centroid distance or the
    /// empty-catalog placeholder rather than a geometric match.
    pub used_fallback: bool,

    /// Effective parameters.
    pub k: usize,
    pub sigma_scale: f64,
    pub min_pixels: usize,
}

impl SelectionDiagnostics {
    /// Returns `true` if the reported center lies on the grid.
    #[must_use]
    pub fn center_on_grid(&self) -> bool {
        (0.0..=self.grid_width as f64).contains(&self.cx_px)
            && (0.0..=self.grid_height as f64).contains(&self.cy_px)
    }
}
