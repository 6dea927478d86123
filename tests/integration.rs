use bodymap_engine::SelectionEngine;
use bodymap_engine::catalog::{BodySide, RegionCatalog};
use bodymap_engine::raster::GridDims;
use bodymap_engine::selection::{
    RegionSelector, Scoring, SelectionError, SelectionOptions, SelectionOutcome,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SMALL: GridDims = GridDims::new(200, 300);

fn defaults() -> SelectionOptions {
    SelectionOptions::default()
}

fn assert_well_formed(outcome: &SelectionOutcome, k: usize) {
    assert!(!outcome.regions.is_empty(), "empty ranking: {outcome:?}");
    assert!(outcome.regions.len() <= k.max(1));
    assert!(outcome.regions.iter().all(|region| region.probability >= 0.0));
    let sum = outcome.probability_sum();
    assert!((sum - 1.0).abs() < 1e-3, "probabilities sum to {sum}");
    for pair in outcome.regions.windows(2) {
        assert!(
            pair[0].probability >= pair[1].probability,
            "ranking out of order: {:?}",
            outcome.regions
        );
    }
}

#[test]
fn engine_initializes() {
    let engine = SelectionEngine::new();
    assert!(engine.is_initialized());
}

#[test]
fn rectus_abdominis_tap_is_unambiguous() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), GridDims::default());
    let outcome = selector.analyze(BodySide::Front, 0.50, 0.55, 0.05, &defaults());

    assert_eq!(outcome.regions.len(), 1);
    let top = &outcome.regions[0];
    assert_eq!(top.id, 209);
    assert_eq!(top.name_primary, "Rectus Abdominis");
    assert_eq!(top.probability, 1.0);
    assert_eq!(outcome.scoring, Scoring::GaussianMass);

    let hint = outcome.family_hint.expect("family hint");
    assert_eq!(hint.family, "Abdomen");
    assert_eq!(hint.confidence, 1.0);

    let diag = outcome.diagnostics.expect("diagnostics");
    assert_eq!((diag.cx_px, diag.cy_px, diag.radius_px), (400.0, 660.0, 40.0));
    assert_eq!(diag.sigma_px, 10.0);
    assert!(!diag.used_fallback);
}

#[test]
fn circle_on_centroid_ranks_its_region_first() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), GridDims::default());
    let catalog = selector.catalog();
    let lat = catalog.region(108).expect("latissimus dorsi left");
    let (cx, cy) = lat.bounds.center();

    let outcome = selector.analyze(BodySide::Back, cx, cy, 0.05, &defaults());
    let top = outcome.top().expect("top region");
    assert_eq!(top.id, 108);
    assert!(top.probability > 0.9);
}

#[test]
fn corner_tap_falls_back_to_nearest_centroids() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), GridDims::default());
    let dims = selector.dims();
    let outcome = selector.analyze(BodySide::Front, 0.0, 0.0, 0.01, &defaults());

    assert_eq!(outcome.scoring, Scoring::CentroidDistance);
    assert!(outcome.used_fallback());
    assert!(outcome.family_hint.is_none());
    let diag = outcome.diagnostics.expect("diagnostics");
    assert!(diag.used_fallback);
    assert_eq!(diag.raw_count, 0);
    assert_well_formed(&outcome, 5);
    assert_eq!(outcome.regions.len(), 5);

    let distances: Vec<f64> = outcome
        .regions
        .iter()
        .map(|region| {
            let id = u16::try_from(region.id).expect("catalog id");
            let (nx, ny) = selector.catalog().region(id).expect("known id").bounds.center();
            (nx * dims.width as f64).hypot(ny * dims.height as f64)
        })
        .collect();
    for pair in distances.windows(2) {
        assert!(pair[0] <= pair[1], "not ordered by distance: {distances:?}");
    }
}

#[test]
fn wild_input_is_clamped_onto_the_grid() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), GridDims::default());
    for side in BodySide::ALL {
        let outcome = selector.analyze(side, -5.0, 99.0, 50.0, &defaults());
        assert_well_formed(&outcome, 5);

        let diag = outcome.diagnostics.expect("diagnostics");
        assert!(diag.center_on_grid());
        assert_eq!((diag.cx_px, diag.cy_px), (0.0, 1200.0));
        assert_eq!(diag.radius_px, 400.0);
    }

    let tiny = selector.analyze(BodySide::Back, f64::NAN, f64::NAN, f64::NAN, &defaults());
    assert_well_formed(&tiny, 5);
    assert_eq!(tiny.diagnostics.expect("diagnostics").radius_px, 8.0);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), SMALL);
    let options = SelectionOptions { k: 8, ..defaults() };

    let first = selector.analyze(BodySide::Front, 0.41, 0.44, 0.12, &options);
    let second = selector.analyze(BodySide::Front, 0.41, 0.44, 0.12, &options);
    assert_eq!(first, second);

    let bits = |outcome: &SelectionOutcome| -> Vec<u64> {
        outcome.regions.iter().map(|region| region.probability.to_bits()).collect()
    };
    assert_eq!(bits(&first), bits(&second));
    assert!(first.regions.len() > 1);
}

#[test]
fn random_taps_always_yield_a_ranking() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), SMALL);
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..300 {
        let side = if rng.random_bool(0.5) { BodySide::Front } else { BodySide::Back };
        let cx = rng.random_range(-0.2..1.2);
        let cy = rng.random_range(-0.2..1.2);
        let radius = rng.random_range(-0.1..0.7);
        let options = SelectionOptions {
            k: rng.random_range(0..8),
            min_pixels: rng.random_range(0..10),
            sigma_scale: rng.random_range(0.05..1.0),
            include_diagnostics: true,
        };

        let outcome = selector.analyze(side, cx, cy, radius, &options);
        assert_well_formed(&outcome, options.k);

        let diag = outcome.diagnostics.expect("diagnostics");
        assert!(diag.center_on_grid());
        assert_eq!(diag.used_fallback, outcome.used_fallback());
        assert_eq!(diag.side, side);
    }
}

#[test]
fn warm_up_builds_both_sides_once() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), SMALL);
    assert_eq!(selector.cache_stats().entries, 0);

    selector.warm_up();
    let stats = selector.cache_stats();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 0);
    assert!(stats.estimated_memory_bytes > 0);

    let _ = selector.analyze(BodySide::Front, 0.5, 0.5, 0.1, &defaults());
    let _ = selector.analyze(BodySide::Back, 0.5, 0.5, 0.1, &defaults());
    let stats = selector.cache_stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.hit_rate(), 0.5);
}

#[test]
fn json_request_round_trips_through_the_selector() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), GridDims::default());
    let outcome = selector
        .analyze_json(
            r#"{"side": "Front", "circle": {"cx": 0.5, "cy": 0.55, "radius": 0.05},
                "includeDiagnostics": false}"#,
        )
        .expect("valid request");

    let json = serde_json::to_value(&outcome).expect("serialize outcome");
    assert_eq!(json["scoring"], "gaussian_mass");
    assert_eq!(json["regions"][0]["id"], 209);
    assert_eq!(json["regions"][0]["name_secondary"], "عضلات البطن المستقيمة");
    assert_eq!(json["family_hint"]["family"], "Abdomen");
    assert!(json.get("diagnostics").is_none());
}

#[test]
fn malformed_requests_are_rejected() {
    let selector = RegionSelector::new(RegionCatalog::builtin(), SMALL);

    let err = selector
        .analyze_json(r#"{"side": "top", "circle": {"cx": 0.5, "cy": 0.5, "radius": 0.1}}"#)
        .unwrap_err();
    assert_eq!(err, SelectionError::UnknownSide("top".to_owned()));

    let err = selector.analyze_json("{not json").unwrap_err();
    assert!(matches!(err, SelectionError::InvalidRequest(_)));
}
