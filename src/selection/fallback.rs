//! Nearest-centroid ranking used when a circle misses every region.

use crate::catalog::RegionDef;
use crate::raster::GridDims;

/// Keeps the inverse distance finite when the tap sits on a centroid.
pub const CENTROID_EPSILON: f64 = 1e-6;

/// Ranks `regions` by pixel distance from `(cx, cy)` to their box centers.
///
/// Returns up to `k` regions, nearest first, each paired with its share of
/// the summed inverse distances. Equal distances keep catalog order.
pub(crate) fn rank_by_centroid(
    regions: &[RegionDef],
    dims: GridDims,
    cx: f64,
    cy: f64,
    k: usize,
) -> Vec<(&RegionDef, f64)> {
    let width = dims.width as f64;
    let height = dims.height as f64;

    let mut by_distance: Vec<(&RegionDef, f64)> = regions
        .iter()
        .map(|def| {
            let (nx, ny) = def.bounds.center();
            let distance = (nx * width - cx).hypot(ny * height - cy);
            (def, distance)
        })
        .collect();
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
    by_distance.truncate(k);

    let inverse_sum: f64 = by_distance
        .iter()
        .map(|(_, distance)| 1.0 / (distance + CENTROID_EPSILON))
        .sum();

    by_distance
        .into_iter()
        .map(|(def, distance)| (def, (1.0 / (distance + CENTROID_EPSILON)) / inverse_sum))
        .collect()
}
