//! heightmark: command-line chart annotator.
//!
//! Places the Baseline, Control, A, B and optional Axis points on a chart
//! image (or on no image at all, for pure arithmetic), prints the height
//! comparison overlay or the metrics JSON, and optionally writes an
//! annotated PNG.
//!
//! # Usage
//!
//! ```text
//! heightmark chart.png --baseline 40,500 --control 80,400 --a 120,300 \
//!     --b 160,350 --axis 10,450 --axis-value 100 --output annotated.png
//! ```

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use heightmark_core::{
    AnnotationConfig, Dimensions, ImagePoint, Metrics, PointName, Region, Session, compute,
};
use heightmark_export::RenderStyle;
use image::RgbaImage;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

/// Quantify bar and marker heights on a chart image.
///
/// Heights are measured in pixels above the Baseline. With an Axis tick
/// the heights are also converted into the tick's units; without one the
/// largest height is used as the scale and the overlay says "(auto)".
#[derive(Parser)]
#[command(name = "heightmark", version)]
struct Cli {
    /// Chart image (PNG, JPEG, BMP, WebP). Optional when only numbers
    /// are wanted.
    image: Option<PathBuf>,

    /// JSON annotation file with `axis_value` and `points`.
    ///
    /// Individual point and axis-value flags override its contents.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Baseline position.
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    baseline: Option<ImagePoint>,

    /// Control bar top.
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    control: Option<ImagePoint>,

    /// Marker A top.
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    a: Option<ImagePoint>,

    /// Marker B top.
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    b: Option<ImagePoint>,

    /// Axis calibration tick.
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    axis: Option<ImagePoint>,

    /// Value represented by the Axis tick (default 100).
    #[arg(long, allow_negative_numbers = true)]
    axis_value: Option<f64>,

    /// Crop the image before placing points; coordinates are then
    /// relative to the crop.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_region)]
    crop: Option<Region>,

    /// Print the metrics dictionary as JSON instead of the overlay.
    #[arg(long)]
    json: bool,

    /// Write the annotated image as PNG.
    #[arg(short, long, value_name = "PNG")]
    output: Option<PathBuf>,
}

/// Parse an `X,Y` integer coordinate.
fn parse_point(s: &str) -> Result<ImagePoint, String> {
    let (x_str, y_str) = s
        .split_once(',')
        .ok_or_else(|| format!("point must be 'X,Y', got: '{s}'"))?;
    let x = x_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid X '{x_str}': {e}"))?;
    let y = y_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid Y '{y_str}': {e}"))?;
    Ok(ImagePoint::new(x, y))
}

/// Parse an `X,Y,W,H` crop region.
fn parse_region(s: &str) -> Result<Region, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, width, height] = parts.as_slice() else {
        return Err(format!("region must be 'X,Y,W,H', got: '{s}'"));
    };
    let num = |label: &str, v: &str| -> Result<u32, String> {
        v.parse()
            .map_err(|e| format!("invalid region {label} '{v}': {e}"))
    };
    Ok(Region {
        x: num("X", x)?,
        y: num("Y", y)?,
        width: num("W", width)?,
        height: num("H", height)?,
    })
}

/// Merge the optional config file with command-line overrides.
fn config_from_cli(cli: &Cli) -> CliResult<AnnotationConfig> {
    let mut config = match cli.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("failed to parse config {}: {e}", path.display()))?
        }
        None => AnnotationConfig::default(),
    };

    if let Some(value) = cli.axis_value {
        config.axis_value = value;
    }
    let overrides = [
        (PointName::Baseline, cli.baseline),
        (PointName::Control, cli.control),
        (PointName::A, cli.a),
        (PointName::B, cli.b),
        (PointName::Axis, cli.axis),
    ];
    for (name, xy) in overrides {
        if let Some(xy) = xy {
            config.points.insert(name, xy);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Load the working image, applying the crop if one was requested.
fn load_image(path: &Path, crop: Option<Region>, session: &mut Session) -> CliResult<RgbaImage> {
    tracing::info!("Loading image: {}", path.display());
    let bytes = std::fs::read(path)
        .map_err(|e| format!("failed to read image {}: {e}", path.display()))?;
    let image = heightmark_export::decode_image(&bytes)?;
    let (width, height) = image.dimensions();
    tracing::info!("Image size: {}x{}", width, height);
    session.load_frame(Dimensions { width, height });

    let Some(region) = crop else {
        return Ok(image);
    };
    session.crop(region)?;
    tracing::info!(
        "Cropped to {}x{} at ({}, {})",
        region.width,
        region.height,
        region.x,
        region.y
    );
    Ok(image::imageops::crop_imm(&image, region.x, region.y, region.width, region.height).to_image())
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = config_from_cli(cli)?;

    if cli.image.is_none() {
        if cli.crop.is_some() {
            return Err("--crop requires an input image".into());
        }
        if cli.output.is_some() {
            return Err("--output requires an input image".into());
        }
    }

    let mut session = Session::new();
    session.set_axis_value(config.axis_value)?;

    let (metrics, image): (Metrics, Option<RgbaImage>) = match cli.image {
        Some(ref path) => {
            let image = load_image(path, cli.crop, &mut session)?;
            for (&name, &xy) in &config.points {
                session.begin_placement(name);
                let placed = session.click(xy)?;
                if let Some(actual) = session.registry().get(placed)
                    && actual != xy
                {
                    tracing::warn!("{name} {xy} is outside the image; clamped to {actual}");
                }
            }
            (session.metrics(), Some(image))
        }
        None => (compute(&config.to_registry(), config.axis_value), None),
    };

    tracing::info!("{}", heightmark_export::title_summary(&metrics));

    if cli.json {
        println!("{}", heightmark_export::metrics_to_json(&metrics)?);
    } else {
        println!("{}", heightmark_export::to_overlay_text(&metrics));
    }

    if let (Some(out_path), Some(image)) = (&cli.output, image) {
        let annotated = heightmark_export::render_annotated(
            &image,
            session.registry(),
            session.axis_value(),
            &RenderStyle::default(),
        )?;
        let png = heightmark_export::encode_png(&annotated)?;
        std::fs::write(out_path, &png)
            .map_err(|e| format!("failed to write {}: {e}", out_path.display()))?;
        tracing::info!(
            "Annotated image written to {} ({} bytes)",
            out_path.display(),
            png.len()
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
