#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("hill_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};

    use hill_viewer::mesh::MeshModel;
    use hill_viewer::options::ViewerOptions;
    use hill_viewer::parse::model_from_json;
    use hill_viewer::render::SvgSurface;
    use hill_viewer::view::PixelPoint;
    use hill_viewer::viewer::Viewer;

    const DEFAULT_WIDTH: f64 = 800.0;
    const DEFAULT_HEIGHT: f64 = 600.0;

    const USAGE: &str = r#"hill_cli (hill-viewer)

USAGE:
  hill_cli render <mesh.json> <soil.json> --out <file.svg> [options]
  hill_cli probe <mesh.json> <soil.json> --at <x>,<y> [options]
  hill_cli stats <mesh.json> <soil.json> [options]

OPTIONS:
  --width <px>        Viewport width (default 800)
  --height <px>       Viewport height (default 600)
  --padding <px>      Padding around the mesh (default 40)
  --tolerance <px>    Hover tolerance for `probe` (default 15)
  --options <file>    Viewer options as JSON; flags above override it
  --out <path>        SVG output path (`render` only)
  --overwrite         Overwrite an existing output file
  -h, --help          Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "render" => cmd_render(&mut args),
            "probe" => cmd_probe(&mut args),
            "stats" => cmd_stats(&mut args),
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

    #[derive(Debug, Default)]
    struct Common {
        mesh: PathBuf,
        soil: PathBuf,
        width: Option<f64>,
        height: Option<f64>,
        padding: Option<f64>,
        tolerance: Option<f64>,
        options: Option<PathBuf>,
        out: Option<PathBuf>,
        at: Option<PixelPoint>,
        overwrite: bool,
        help: bool,
    }

    impl Common {
        fn parse(args: &mut Args) -> Result<Self, String> {
            let mut common = Self::default();
            let mut inputs = Vec::new();

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--width" => common.width = Some(parse_number("--width", &args.value("--width")?)?),
                    "--height" => {
                        common.height = Some(parse_number("--height", &args.value("--height")?)?);
                    }
                    "--padding" => {
                        common.padding = Some(parse_number("--padding", &args.value("--padding")?)?);
                    }
                    "--tolerance" => {
                        common.tolerance =
                            Some(parse_number("--tolerance", &args.value("--tolerance")?)?);
                    }
                    "--options" => common.options = Some(PathBuf::from(args.value("--options")?)),
                    "--out" => common.out = Some(PathBuf::from(args.value("--out")?)),
                    "--at" => common.at = Some(parse_point(&args.value("--at")?)?),
                    "--overwrite" => common.overwrite = true,
                    "-h" | "--help" => common.help = true,
                    other if other.starts_with("--") => {
                        return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                    }
                    _ => inputs.push(PathBuf::from(arg)),
                }
            }

            if common.help {
                return Ok(common);
            }
            let [mesh, soil]: [PathBuf; 2] = inputs
                .try_into()
                .map_err(|_| "expected <mesh.json> and <soil.json>".to_string())?;
            common.mesh = mesh;
            common.soil = soil;
            Ok(common)
        }

        fn options(&self) -> Result<ViewerOptions, String> {
            let mut options = match &self.options {
                Some(path) => serde_json::from_str(&read_text(path)?)
                    .map_err(|e| format!("options {}: {e}", path.display()))?,
                None => ViewerOptions::default(),
            };
            if let Some(padding) = self.padding {
                options.padding = padding;
            }
            if let Some(tolerance) = self.tolerance {
                options.tolerance_px = tolerance;
            }
            Ok(options)
        }

        fn model(&self) -> Result<MeshModel, String> {
            let mesh = read_text(&self.mesh)?;
            let soil = read_text(&self.soil)?;
            model_from_json(&mesh, &soil).map_err(|e| e.to_string())
        }

        fn viewer(&self) -> Result<Viewer, String> {
            let mut viewer = Viewer::new(self.options()?).map_err(|e| e.to_string())?;
            viewer.load(0, self.model()?);
            viewer.set_viewport(
                self.width.unwrap_or(DEFAULT_WIDTH),
                self.height.unwrap_or(DEFAULT_HEIGHT),
            );
            Ok(viewer)
        }
    }

    fn cmd_render(args: &mut Args) -> Result<(), String> {
        let common = Common::parse(args)?;
        if common.help {
            print_usage();
            return Ok(());
        }
        let out = common.out.clone().ok_or("render requires --out <file.svg>")?;

        let viewer = common.viewer()?;
        let mut svg = SvgSurface::new();
        let diagnostics = viewer
            .render(&mut svg)
            .map_err(|e| format!("svg output: {e}"))?;
        write_text_file(&out, svg.as_str(), common.overwrite)?;

        println!(
            "wrote {} ({} elements, {} soil ids, {}x{})",
            out.display(),
            diagnostics.element_count,
            diagnostics.category_count,
            diagnostics.width,
            diagnostics.height
        );
        if diagnostics.wrapped_count > 0 {
            println!(
                "note: {} elements use ids beyond the palette and reuse its colours",
                diagnostics.wrapped_count
            );
        }
        if diagnostics.degenerate_viewport {
            println!("note: viewport has no room left after padding");
        }
        Ok(())
    }

    fn cmd_probe(args: &mut Args) -> Result<(), String> {
        let common = Common::parse(args)?;
        if common.help {
            print_usage();
            return Ok(());
        }
        let at = common.at.ok_or("probe requires --at <x>,<y>")?;

        let mut viewer = common.viewer()?;
        viewer.pointer_move(at);
        match viewer.inspector() {
            Some(inspector) => println!("{inspector}"),
            None => println!(
                "no node within {}px of ({}, {})",
                viewer.options().tolerance_px,
                at.x,
                at.y
            ),
        }
        Ok(())
    }

    fn cmd_stats(args: &mut Args) -> Result<(), String> {
        let common = Common::parse(args)?;
        if common.help {
            print_usage();
            return Ok(());
        }

        let viewer = common.viewer()?;
        let model = viewer.model().ok_or("no model loaded")?;
        let mesh = model.mesh();
        let bounds = mesh.bounds();
        let unit = &viewer.options().unit_suffix;

        println!("nodes:    {}x{} ({})", mesh.rows(), mesh.cols(), mesh.node_count());
        println!("elements: {}", model.element_count());
        println!(
            "x range:  {:.2}{unit} .. {:.2}{unit}",
            bounds.min_x, bounds.max_x
        );
        println!(
            "z range:  {:.2}{unit} .. {:.2}{unit}",
            bounds.min_z, bounds.max_z
        );
        println!("soil ids: {:?}", model.categories().unique_ids());
        if let Some(transform) = viewer.transform() {
            println!(
                "scale:    {:.4} px/{unit} (x), {:.4} px/{unit} (z)",
                transform.scale_x(),
                transform.scale_z()
            );
        }
        let locator = match viewer.locator() {
            Some(hill_viewer::spatial::Locator::Grid(_)) => "grid index",
            Some(hill_viewer::spatial::Locator::Linear(_)) | None => "linear scan",
        };
        println!("locator:  {locator}");
        Ok(())
    }

    fn parse_number(flag: &str, raw: &str) -> Result<f64, String> {
        raw.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid value for {flag}: `{raw}` ({e})"))
    }

    fn parse_point(raw: &str) -> Result<PixelPoint, String> {
        let (x, y) = raw
            .split_once(',')
            .ok_or_else(|| format!("invalid value for --at: `{raw}` (expected <x>,<y>)"))?;
        Ok(PixelPoint::new(
            parse_number("--at", x)?,
            parse_number("--at", y)?,
        ))
    }

    fn read_text(path: &Path) -> Result<String, String> {
        fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
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
    }
}
