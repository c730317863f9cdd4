//! plotpath: turn an image into pen plotter G-code.
//!
//! Reads an image file, extracts edges, links them into strokes, and
//! writes a G-code program. Optionally writes an SVG preview of the
//! strokes and prints the edge mask as rows of `1`/`0`.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin plotpath -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use plotpath_export::{GcodeConfig, SvgMetadata};
use plotpath_pipeline::{Dimensions, PipelineConfig, StagedResult};

/// Convert an image into a pen plotter G-code program.
#[derive(Parser)]
#[command(name = "plotpath", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Where to write the G-code program.
    #[arg(short, long, default_value = "output.gcode")]
    output: PathBuf,

    /// Starting parameter set; individual flags override it.
    #[arg(long, value_enum, default_value_t = Preset::Fine)]
    preset: Preset,

    /// Gradient magnitude threshold (higher = fewer edges).
    #[arg(long)]
    threshold: Option<u32>,

    /// Neighbor search radius for stroke linking.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    radius: Option<u32>,

    /// Working width in pixels (resize before edge detection).
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Working height in pixels (resize before edge detection).
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Keep the image at its native size.
    #[arg(long, conflicts_with_all = ["width", "height"])]
    no_resize: bool,

    /// Output coordinate space width (defaults to the working width).
    #[arg(long, requires = "target_height")]
    target_width: Option<u32>,

    /// Output coordinate space height (defaults to the working height).
    #[arg(long, requires = "target_width")]
    target_height: Option<u32>,

    /// Z height with the pen lifted.
    #[arg(long, default_value_t = GcodeConfig::DEFAULT_PEN_UP_Z, allow_hyphen_values = true)]
    pen_up_z: i32,

    /// Z height with the pen lowered.
    #[arg(long, default_value_t = GcodeConfig::DEFAULT_PEN_DOWN_Z, allow_hyphen_values = true)]
    pen_down_z: i32,

    /// Do not emit `G28` (home all axes) in the preamble.
    #[arg(long)]
    no_home: bool,

    /// Also write an SVG preview of the strokes.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the edge mask to stdout, one row of 1/0 per line.
    #[arg(long)]
    print_mask: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, `--preset`, `--threshold`, `--radius`, and the
    /// resize flags are ignored. The JSON must be a valid
    /// `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Parameter presets.
#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// 300×300, radius 1, threshold 100.
    Fine,
    /// 180×180, radius 2, threshold 128.
    Coarse,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, the preset is
/// adjusted by the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let mut config = match cli.preset {
        Preset::Fine => PipelineConfig::fine(),
        Preset::Coarse => PipelineConfig::coarse(),
    };
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(radius) = cli.radius {
        config.neighbor_search_radius = radius;
    }
    if cli.no_resize {
        config.working_size = None;
    } else if let (Some(width), Some(height)) = (cli.width, cli.height) {
        config.working_size = Some(Dimensions::new(width, height));
    }
    Ok(config)
}

/// Build a [`GcodeConfig`] from CLI arguments.
fn gcode_config_from_cli(cli: &Cli) -> GcodeConfig {
    GcodeConfig {
        target_scale: cli
            .target_width
            .zip(cli.target_height)
            .map(|(w, h)| Dimensions::new(w, h)),
        pen_up_z: cli.pen_up_z,
        pen_down_z: cli.pen_down_z,
        home: !cli.no_home,
    }
}

/// Stream the G-code program for `staged` into a new file at `path`.
fn write_program(
    path: &std::path::Path,
    staged: &StagedResult,
    config: &GcodeConfig,
) -> Result<usize, plotpath_export::ExportError> {
    let file = File::create(path)?;
    plotpath_export::write_gcode(
        BufWriter::new(file),
        &staged.strokes,
        staged.dimensions(),
        config,
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let gcode_config = gcode_config_from_cli(&cli);

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    log::debug!("Config: {config:?}");

    let staged = match plotpath_pipeline::process_staged(&image_bytes, &config) {
        Ok(staged) => staged,
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.print_mask {
        for row in staged.mask.to_text_rows() {
            println!("{row}");
        }
    }

    match write_program(&cli.output, &staged, &gcode_config) {
        Ok(lines) => log::info!(
            "G-code written to {} ({lines} lines, {} strokes)",
            cli.output.display(),
            staged.summary.stroke_count,
        ),
        Err(e) => {
            eprintln!("Error writing G-code to {}: {e}", cli.output.display());
            return ExitCode::FAILURE;
        }
    }

    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("plotpath");
        let desc = format!(
            "threshold={} radius={}",
            config.threshold, config.neighbor_search_radius,
        );
        let metadata = SvgMetadata {
            title: Some(title),
            description: Some(&desc),
        };
        let svg = plotpath_export::to_svg(&staged.strokes, staged.dimensions(), &metadata);
        match std::fs::write(svg_path, &svg) {
            Ok(()) => log::info!("SVG written to {} ({} bytes)", svg_path.display(), svg.len()),
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
