#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod raster;
pub mod resolve;
pub mod selection;

use std::fmt;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use catalog::{BodySide, RegionDef};
use selection::{
    AnalyzeRequest, Language, RegionSelector, SelectionError, SelectionOptions, SelectionOutcome,
    render_grounding_context,
};

pub use catalog::RegionCatalog;
pub use raster::GridDims;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start rayon thread pool: {err}")))
}

#[derive(Debug, Serialize)]
struct SideExport<'a> {
    side: BodySide,
    image: &'static str,
    regions: &'a [RegionDef],
}

/// Public entry point for the browser client.
///
/// All engines share the process-wide selector, so label grids are built at
/// most once per side no matter how many engines exist.
#[wasm_bindgen]
pub struct SelectionEngine {
    initialized: bool,
    selector: &'static RegionSelector<'static>,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SelectionEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SelectionEngine {
        SelectionEngine {
            initialized: true,
            selector: RegionSelector::global(),
        }
    }

    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Builds both label grids now so the first tap does not pay for it.
    #[wasm_bindgen]
    pub fn warm_up(&self) {
        self.selector.warm_up();
    }

    /// Resolves a circle in normalized coordinates. `options` may be
    /// `undefined` or a partial options object.
    #[wasm_bindgen]
    pub fn analyze(
        &self,
        side: &str,
        cx: f64,
        cy: f64,
        radius: f64,
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let options = options_from_js(options)?;
        let outcome = self
            .selector
            .analyze_named(side, cx, cy, radius, &options)
            .map_err(to_js_error)?;
        report_placeholder(&outcome);
        to_js(&outcome)
    }

    /// Resolves a `{ side, circle: { cx, cy, radius }, ...options }` object.
    #[wasm_bindgen]
    pub fn analyze_request(&self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: AnalyzeRequest =
            serde_wasm_bindgen::from_value(request).map_err(to_js_error)?;
        let outcome = self.selector.analyze_request(&request).map_err(to_js_error)?;
        report_placeholder(&outcome);
        to_js(&outcome)
    }

    /// The catalog rows of one side, for drawing the overlay.
    #[wasm_bindgen]
    pub fn regions(&self, side: &str) -> Result<JsValue, JsValue> {
        let side: BodySide = side.parse().map_err(to_js_error)?;
        let catalog = self.selector.catalog();
        to_js(&SideExport {
            side,
            image: catalog.image(side),
            regions: catalog.regions(side),
        })
    }

    /// Resolves a circle and renders the result as assistant context text.
    #[wasm_bindgen]
    pub fn grounding_context(
        &self,
        side: &str,
        cx: f64,
        cy: f64,
        radius: f64,
        language: &str,
    ) -> Result<String, JsValue> {
        grounding_context(self.selector, side, cx, cy, radius, language).map_err(to_js_error)
    }
}

fn grounding_context(
    selector: &RegionSelector<'_>,
    side: &str,
    cx: f64,
    cy: f64,
    radius: f64,
    language: &str,
) -> Result<String, SelectionError> {
    let language: Language = language.parse()?;
    let options = SelectionOptions {
        include_diagnostics: false,
        ..SelectionOptions::default()
    };
    let outcome = selector.analyze_named(side, cx, cy, radius, &options)?;
    report_placeholder(&outcome);
    Ok(render_grounding_context(&outcome.regions, language))
}

/// An empty side catalog is a configuration defect; the core only returns
/// a placeholder, so the boundary is where it gets reported.
fn report_placeholder(outcome: &SelectionOutcome) {
    if outcome.regions.iter().any(|region| region.is_unspecified()) {
        let side = outcome
            .diagnostics
            .map_or_else(|| "unknown".to_owned(), |diag| diag.side.to_string());
        log::warn!("region catalog for side `{side}` is empty; returned placeholder region");
    }
}

fn options_from_js(options: JsValue) -> Result<SelectionOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(SelectionOptions::default());
    }
    serde_wasm_bindgen::from_value(options).map_err(to_js_error)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
