//! Roll-up of scored regions into coarse anatomical families.

use serde::Serialize;

use super::ScoredRegion;
use crate::catalog::RegionCatalog;

/// The family holding the largest share of a query's Gaussian mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FamilyHint {
    pub family: &'static str,
    /// Dominant family weight divided by the total weight, in `(0, 1]`.
    pub confidence: f64,
}

/// Sums region weights per family and returns the dominant one.
///
/// Regions unknown to `catalog` are ignored. When two families tie, the one
/// seen first in `scored` wins. Returns `None` for an empty input or a
/// non-positive total.
#[must_use]
pub fn dominant_family(scored: &[ScoredRegion], catalog: &RegionCatalog) -> Option<FamilyHint> {
    let mut families: Vec<(&'static str, f64)> = Vec::new();
    let mut total = 0.0;

    for item in scored {
        let Some(def) = catalog.region(item.region_id) else {
            continue;
        };
        match families.iter_mut().find(|(family, _)| *family == def.family) {
            Some((_, weight)) => *weight += item.weight,
            None => families.push((def.family, item.weight)),
        }
        total += item.weight;
    }

    if families.is_empty() || total <= 0.0 {
        return None;
    }

    let mut best = families[0];
    for &candidate in &families[1..] {
        if candidate.1 > best.1 {
            best = candidate;
        }
    }

    Some(FamilyHint {
        family: best.0,
        confidence: best.1 / total,
    })
}
