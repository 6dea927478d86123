//! Selection facade: the single entry point for resolving a circle gesture.
//!
//! [`RegionSelector::analyze`] clamps the normalized gesture, scales it onto
//! the label grid of the requested side, scores intersecting regions and
//! turns the scores into a probability ranking. When the circle touches no
//! region the ranking falls back to centroid distance, so a call over a
//! non-empty catalog never returns an empty list.
//!
//! The two paths score differently (Gaussian mass versus inverse centroid
//! distance); [`SelectionOutcome::scoring`] tells callers which one produced
//! the probabilities, since they are not comparable across paths.

mod context;
mod diagnostics;
mod fallback;
mod request;

pub use context::{Language, render_grounding_context};
pub use diagnostics::SelectionDiagnostics;
pub use fallback::CENTROID_EPSILON;
pub use request::{AnalyzeRequest, CirclePayload};

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{BodySide, RegionCatalog, RegionDef};
use crate::raster::{GridDims, LabelGridCache, LabelGridCacheStats};
use crate::resolve::{
    FamilyHint, QueryCircle, ResolveParams, ScoredRegion, dominant_family, gaussian_sigma,
    resolve_circle,
};

/// Normalized radius range accepted by [`RegionSelector::analyze`].
pub const RADIUS_RANGE: (f64, f64) = (0.01, 0.5);

/// Id reported by the last-resort result of an empty side catalog.
pub const UNSPECIFIED_REGION_ID: i32 = -1;

/// Errors raised at the caller boundary, before the core is reached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown body side `{0}` (expected `front` or `back`)")]
    UnknownSide(String),
    #[error("invalid selection request: {0}")]
    InvalidRequest(String),
}

/// Caller-tunable parameters; every field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionOptions {
    /// Maximum number of ranked regions. `0` is treated as `1`.
    pub k: usize,
    #[serde(alias = "minPixels")]
    pub min_pixels: usize,
    #[serde(alias = "sigmaScale")]
    pub sigma_scale: f64,
    #[serde(alias = "includeDiagnostics")]
    pub include_diagnostics: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        let params = ResolveParams::default();
        Self {
            k: params.k,
            min_pixels: params.min_pixels,
            sigma_scale: params.sigma_scale,
            include_diagnostics: true,
        }
    }
}

impl SelectionOptions {
    fn resolve_params(&self) -> ResolveParams {
        ResolveParams {
            k: self.k.max(1),
            min_pixels: self.min_pixels,
            sigma_scale: self.sigma_scale,
        }
    }
}

/// Which scoring function produced an outcome's probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Normalized Gaussian mass of the circle/region intersection.
    GaussianMass,
    /// Normalized inverse distance to box centroids (no intersection).
    CentroidDistance,
    /// The side has no regions at all; a single placeholder is returned.
    Unspecified,
}

/// One ranked region of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionSelection {
    pub id: i32,
    /// Rounded to 4 decimals.
    pub probability: f64,
    pub name_primary: &'static str,
    pub name_secondary: &'static str,
    pub family: &'static str,
}

impl RegionSelection {
    fn from_def(def: &RegionDef, probability: f64) -> Self {
        Self {
            id: i32::from(def.id),
            probability: round_to(probability, 4),
            name_primary: def.name_primary,
            name_secondary: def.name_secondary,
            family: def.family,
        }
    }

    /// Placeholder emitted when a side has no regions.
    #[must_use]
    pub const fn unspecified() -> Self {
        Self {
            id: UNSPECIFIED_REGION_ID,
            probability: 1.0,
            name_primary: "Unspecified",
            name_secondary: "غير محدد",
            family: "unknown",
        }
    }

    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        self.id == UNSPECIFIED_REGION_ID
    }
}

/// Result of one [`RegionSelector::analyze`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOutcome {
    /// Ranked regions, most probable first. Never empty.
    pub regions: Vec<RegionSelection>,
    /// Dominant family of the geometric match; `None` on the fallback path.
    pub family_hint: Option<FamilyHint>,
    pub scoring: Scoring,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<SelectionDiagnostics>,
}

impl SelectionOutcome {
    /// The most probable region.
    #[must_use]
    pub fn top(&self) -> Option<&RegionSelection> {
        self.regions.first()
    }

    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.scoring != Scoring::GaussianMass
    }

    #[must_use]
    pub fn probability_sum(&self) -> f64 {
        self.regions.iter().map(|region| region.probability).sum()
    }
}

/// Composition root of the resolver: a catalog plus its label grid cache.
#[derive(Debug)]
pub struct RegionSelector<'c> {
    catalog: &'c RegionCatalog,
    grids: LabelGridCache,
}

impl RegionSelector<'static> {
    /// Process-wide selector over the built-in catalog at the default
    /// resolution.
    pub fn global() -> &'static RegionSelector<'static> {
        static INSTANCE: OnceLock<RegionSelector<'static>> = OnceLock::new();
        INSTANCE.get_or_init(|| RegionSelector::new(RegionCatalog::builtin(), GridDims::default()))
    }
}

impl<'c> RegionSelector<'c> {
    #[must_use]
    pub fn new(catalog: &'c RegionCatalog, dims: GridDims) -> Self {
        Self {
            catalog,
            grids: LabelGridCache::new(dims),
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &'c RegionCatalog {
        self.catalog
    }

    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.grids.dims()
    }

    #[must_use]
    pub fn cache_stats(&self) -> LabelGridCacheStats {
        self.grids.stats()
    }

    /// Rasterizes both sides now instead of on the first query.
    pub fn warm_up(&self) {
        for side in BodySide::ALL {
            let _ = self.grids.get_or_build(side, self.catalog.regions(side));
        }
    }

    /// Resolves a circle gesture given in normalized image coordinates.
    ///
    /// Out-of-range input is clamped, never rejected: `cx`/`cy` to `[0, 1]`
    /// and `radius` to [`RADIUS_RANGE`]. NaN clamps to the lower bound.
    #[must_use]
    pub fn analyze(
        &self,
        side: BodySide,
        cx_norm: f64,
        cy_norm: f64,
        radius_norm: f64,
        options: &SelectionOptions,
    ) -> SelectionOutcome {
        let cx_norm = clamp(cx_norm, 0.0, 1.0);
        let cy_norm = clamp(cy_norm, 0.0, 1.0);
        let radius_norm = clamp(radius_norm, RADIUS_RANGE.0, RADIUS_RANGE.1);

        let dims = self.dims();
        let circle = QueryCircle::new(
            cx_norm * dims.width as f64,
            cy_norm * dims.height as f64,
            radius_norm * dims.min_extent() as f64,
        );
        let params = options.resolve_params();

        let regions = self.catalog.regions(side);
        let grid = self.grids.get_or_build(side, regions);
        let raw = resolve_circle(grid, circle, &params);

        let (ranked, scoring) = match self.normalize(&raw) {
            Some(ranked) => (ranked, Scoring::GaussianMass),
            None => self.fallback(side, circle, params.k),
        };

        let family_hint = dominant_family(&raw, self.catalog).map(|hint| FamilyHint {
            confidence: round_to(hint.confidence, 4),
            ..hint
        });

        let diagnostics = options.include_diagnostics.then(|| SelectionDiagnostics {
            side,
            cx_px: round_to(circle.cx, 2),
            cy_px: round_to(circle.cy, 2),
            radius_px: round_to(circle.radius, 2),
            sigma_px: round_to(gaussian_sigma(circle.radius, params.sigma_scale), 2),
            grid_width: dims.width,
            grid_height: dims.height,
            raw_count: raw.len(),
            used_fallback: scoring != Scoring::GaussianMass,
            k: params.k,
            sigma_scale: params.sigma_scale,
            min_pixels: params.min_pixels,
        });

        SelectionOutcome {
            regions: ranked,
            family_hint,
            scoring,
            diagnostics,
        }
    }

    /// Boundary variant of [`Self::analyze`] that parses the side name.
    pub fn analyze_named(
        &self,
        side: &str,
        cx_norm: f64,
        cy_norm: f64,
        radius_norm: f64,
        options: &SelectionOptions,
    ) -> Result<SelectionOutcome, SelectionError> {
        let side: BodySide = side.parse()?;
        Ok(self.analyze(side, cx_norm, cy_norm, radius_norm, options))
    }

    /// Runs a request in the shape posted by the browser client.
    pub fn analyze_request(&self, request: &AnalyzeRequest) -> Result<SelectionOutcome, SelectionError> {
        let CirclePayload { cx, cy, radius } = request.circle;
        self.analyze_named(&request.side, cx, cy, radius, &request.options)
    }

    /// Parses a JSON [`AnalyzeRequest`] and runs it.
    pub fn analyze_json(&self, json: &str) -> Result<SelectionOutcome, SelectionError> {
        let request: AnalyzeRequest = serde_json::from_str(json)
            .map_err(|err| SelectionError::InvalidRequest(err.to_string()))?;
        self.analyze_request(&request)
    }

    /// Converts raw weights to rounded probabilities. `None` when nothing
    /// with positive weight survived.
    fn normalize(&self, raw: &[ScoredRegion]) -> Option<Vec<RegionSelection>> {
        let total: f64 = raw.iter().map(|item| item.weight).sum();
        if total <= 0.0 {
            return None;
        }

        let ranked: Vec<RegionSelection> = raw
            .iter()
            .filter_map(|item| {
                let def = self.catalog.region(item.region_id)?;
                Some(RegionSelection::from_def(def, item.weight / total))
            })
            .collect();

        (!ranked.is_empty()).then_some(ranked)
    }

    fn fallback(&self, side: BodySide, circle: QueryCircle, k: usize) -> (Vec<RegionSelection>, Scoring) {
        let regions = self.catalog.regions(side);
        if regions.is_empty() {
            return (vec![RegionSelection::unspecified()], Scoring::Unspecified);
        }

        log::debug!(
            "circle ({:.1}, {:.1}) r={:.1} missed every {side} region; ranking by centroid distance",
            circle.cx,
            circle.cy,
            circle.radius
        );

        let ranked = fallback::rank_by_centroid(regions, self.dims(), circle.cx, circle.cy, k)
            .into_iter()
            .map(|(def, probability)| RegionSelection::from_def(def, probability))
            .collect();
        (ranked, Scoring::CentroidDistance)
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NormBox, SideCatalog};

    const SMALL: GridDims = GridDims::new(200, 300);

    fn def(id: u16, family: &'static str, bounds: [f64; 4]) -> RegionDef {
        RegionDef {
            id,
            name_primary: "Test",
            name_secondary: "اختبار",
            family,
            bounds: NormBox::from_array(bounds),
        }
    }

    #[test]
    fn clamp_handles_nan_and_infinities() {
        assert_eq!(clamp(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(clamp(f64::INFINITY, 0.0, 1.0), 1.0);
        assert_eq!(clamp(f64::NEG_INFINITY, 0.01, 0.5), 0.01);
        assert_eq!(clamp(0.3, 0.0, 1.0), 0.3);
    }

    #[test]
    fn round_to_four_decimals() {
        assert_eq!(round_to(0.123_456, 4), 0.1235);
        assert_eq!(round_to(1.0, 4), 1.0);
        assert_eq!(round_to(123.456_7, 2), 123.46);
    }

    #[test]
    fn options_default_and_partial_json() {
        let defaults = SelectionOptions::default();
        assert_eq!(defaults.k, 5);
        assert_eq!(defaults.min_pixels, 3);
        assert_eq!(defaults.sigma_scale, 0.25);
        assert!(defaults.include_diagnostics);

        let parsed: SelectionOptions =
            serde_json::from_str(r#"{"k": 2, "minPixels": 7}"#).expect("partial options");
        assert_eq!(parsed.k, 2);
        assert_eq!(parsed.min_pixels, 7);
        assert_eq!(parsed.sigma_scale, 0.25);
    }

    #[test]
    fn empty_side_yields_unspecified_placeholder() {
        let catalog = RegionCatalog::new(
            SideCatalog::new("front.png", vec![def(1, "Core", [0.2, 0.2, 0.8, 0.8])]),
            SideCatalog::new("back.png", Vec::new()),
        )
        .expect("valid catalog");
        let selector = RegionSelector::new(&catalog, SMALL);

        let outcome = selector.analyze(BodySide::Back, 0.5, 0.5, 0.1, &SelectionOptions::default());
        assert_eq!(outcome.regions, vec![RegionSelection::unspecified()]);
        assert_eq!(outcome.scoring, Scoring::Unspecified);
        assert!(outcome.family_hint.is_none());
        assert!(outcome.diagnostics.expect("diagnostics").used_fallback);
    }

    #[test]
    fn overlap_goes_to_later_catalog_entry() {
        let catalog = RegionCatalog::new(
            SideCatalog::new(
                "front.png",
                vec![
                    def(1, "Outer", [0.1, 0.1, 0.9, 0.9]),
                    def(2, "Inner", [0.4, 0.4, 0.6, 0.6]),
                ],
            ),
            SideCatalog::new("back.png", Vec::new()),
        )
        .expect("valid catalog");
        let selector = RegionSelector::new(&catalog, SMALL);

        let outcome = selector.analyze(BodySide::Front, 0.5, 0.5, 0.02, &SelectionOptions::default());
        assert_eq!(outcome.regions.len(), 1);
        assert_eq!(outcome.regions[0].id, 2);
        assert_eq!(outcome.family_hint.map(|hint| hint.family), Some("Inner"));
    }

    #[test]
    fn zero_k_still_returns_one_region() {
        let selector = RegionSelector::new(RegionCatalog::builtin(), SMALL);
        let options = SelectionOptions { k: 0, ..SelectionOptions::default() };

        let hit = selector.analyze(BodySide::Front, 0.5, 0.55, 0.05, &options);
        assert_eq!(hit.regions.len(), 1);

        let miss = selector.analyze(BodySide::Front, 0.0, 0.0, 0.01, &options);
        assert_eq!(miss.regions.len(), 1);
        assert_eq!(miss.diagnostics.expect("diagnostics").k, 1);
    }

    #[test]
    fn diagnostics_can_be_disabled() {
        let selector = RegionSelector::new(RegionCatalog::builtin(), SMALL);
        let options = SelectionOptions { include_diagnostics: false, ..SelectionOptions::default() };
        let outcome = selector.analyze(BodySide::Back, 0.5, 0.2, 0.05, &options);
        assert!(outcome.diagnostics.is_none());
        assert_eq!(outcome.scoring, Scoring::GaussianMass);

        let json = serde_json::to_value(&outcome).expect("serialize");
        assert!(json.get("diagnostics").is_none());
    }

    #[test]
    fn rejects_unknown_side_at_the_boundary() {
        let selector = RegionSelector::new(RegionCatalog::builtin(), SMALL);
        let err = selector
            .analyze_named("side", 0.5, 0.5, 0.1, &SelectionOptions::default())
            .unwrap_err();
        assert_eq!(err, SelectionError::UnknownSide("side".to_owned()));
        assert_eq!(selector.cache_stats().entries, 0);
    }
}
