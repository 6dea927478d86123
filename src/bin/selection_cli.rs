#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("selection_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use bodymap_engine::catalog::BodySide;
    use bodymap_engine::selection::{
        Language, RegionSelector, SelectionOptions, SelectionOutcome, render_grounding_context,
    };

    const USAGE: &str = r#"selection_cli (bodymap-engine)

USAGE:
  selection_cli list <front|back>
  selection_cli analyze <front|back> <cx> <cy> <radius> [options]
  selection_cli context <front|back> <cx> <cy> <radius> [--lang ar|en]
  selection_cli request <json>

Coordinates and radius are normalized to the image (0..1).

OPTIONS (analyze):
  --k <n>              Maximum number of ranked regions (default 5)
  --min-pixels <n>     Minimum pixel count per region (default 3)
  --sigma-scale <f>    Gaussian sigma as a fraction of the radius (default 0.25)
  --no-diagnostics     Omit the diagnostics record
  --json               Print the outcome as JSON
  -h, --help           Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => cmd_list(&mut args),
            "analyze" => cmd_analyze(&mut args),
            "context" => cmd_context(&mut args),
            "request" => cmd_request(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn cmd_list(args: &mut Args) -> Result<(), String> {
        let side = args.side()?;
        let catalog = RegionSelector::global().catalog();
        println!("{side} ({})", catalog.image(side));
        for region in catalog.regions(side) {
            let [x1, y1, x2, y2] = region.bounds.to_array();
            println!(
                "{:>4}  {:<32} {:<24} [{x1:.2}, {y1:.2}, {x2:.2}, {y2:.2}]  {}",
                region.id, region.name_primary, region.family, region.name_secondary
            );
        }
        Ok(())
    }

    fn cmd_analyze(args: &mut Args) -> Result<(), String> {
        let side = args.side()?;
        let (cx, cy, radius) = args.circle()?;

        let mut options = SelectionOptions::default();
        let mut json = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--k" => options.k = parse_number(&args.value("--k")?, "--k")?,
                "--min-pixels" => {
                    options.min_pixels = parse_number(&args.value("--min-pixels")?, "--min-pixels")?;
                }
                "--sigma-scale" => {
                    options.sigma_scale =
                        parse_number(&args.value("--sigma-scale")?, "--sigma-scale")?;
                }
                "--no-diagnostics" => options.include_diagnostics = false,
                "--json" => json = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let outcome = RegionSelector::global().analyze(side, cx, cy, radius, &options);
        warn_if_placeholder(&outcome);
        if json {
            print_json(&outcome)
        } else {
            print_outcome(&outcome);
            Ok(())
        }
    }

    fn cmd_context(args: &mut Args) -> Result<(), String> {
        let side = args.side()?;
        let (cx, cy, radius) = args.circle()?;

        let mut language = Language::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--lang" => {
                    language = args.value("--lang")?.parse().map_err(|e| format!("{e}"))?;
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let options = SelectionOptions {
            include_diagnostics: false,
            ..SelectionOptions::default()
        };
        let outcome = RegionSelector::global().analyze(side, cx, cy, radius, &options);
        warn_if_placeholder(&outcome);
        println!("{}", render_grounding_context(&outcome.regions, language));
        Ok(())
    }

    fn cmd_request(args: &mut Args) -> Result<(), String> {
        let payload = args.next().ok_or("missing request json")?;
        let outcome = RegionSelector::global()
            .analyze_json(&payload)
            .map_err(|e| e.to_string())?;
        warn_if_placeholder(&outcome);
        print_json(&outcome)
    }

    fn print_outcome(outcome: &SelectionOutcome) {
        for (rank, region) in outcome.regions.iter().enumerate() {
            println!(
                "{:>2}. {:<32} p={:.4}  id={}  {}",
                rank + 1,
                region.name_primary,
                region.probability,
                region.id,
                region.family
            );
        }
        match outcome.family_hint {
            Some(hint) => println!("family: {} ({:.4})", hint.family, hint.confidence),
            None => println!("family: -"),
        }
        if let Some(diag) = outcome.diagnostics {
            eprintln!(
                "{}: center=({:.2}, {:.2}) r={:.2} sigma={:.2} grid={}x{} raw={} fallback={}",
                diag.side,
                diag.cx_px,
                diag.cy_px,
                diag.radius_px,
                diag.sigma_px,
                diag.grid_width,
                diag.grid_height,
                diag.raw_count,
                diag.used_fallback
            );
        }
    }

    fn print_json(outcome: &SelectionOutcome) -> Result<(), String> {
        let text = serde_json::to_string_pretty(outcome).map_err(|e| format!("encode json: {e}"))?;
        println!("{text}");
        Ok(())
    }

    fn warn_if_placeholder(outcome: &SelectionOutcome) {
        if outcome.regions.iter().any(|region| region.is_unspecified()) {
            eprintln!("warning: side catalog is empty; result is a placeholder");
        }
    }

    fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
        raw.parse()
            .map_err(|_| format!("invalid value `{raw}` for {what}"))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }

        fn side(&mut self) -> Result<BodySide, String> {
            let raw = self.next().ok_or("missing side (front or back)")?;
            raw.parse().map_err(|e| format!("{e}"))
        }

        fn circle(&mut self) -> Result<(f64, f64, f64), String> {
            let mut coord = |name: &str| -> Result<f64, String> {
                let raw = self.next().ok_or_else(|| format!("missing {name}"))?;
                parse_number(&raw, name)
            };
            Ok((coord("cx")?, coord("cy")?, coord("radius")?))
        }
    }
}
