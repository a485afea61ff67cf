//! nodefx - command-line driver for the nodefx image engines
//!
//! Runs one engine per invocation on 8-bit image files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nodefx_ops::noise::NoiseType;
use nodefx_ops::texture::ColorMode;
use nodefx_ops::{BlendMode, DistortKind, EdgeAlgorithm, Filter, HalftoneEffect};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "nodefx")]
#[command(author, version, about = "Image effects from the command line")]
#[command(long_about = "
Runs a single nodefx engine on an image file.

Engine parameters come from flags, or from a YAML/JSON preset holding the
engine's parameter struct (flags override preset values).

Examples:
  nodefx info photo.png
  nodefx grade photo.png -o out.png --exposure 0.5 --saturation 1.2
  nodefx distort photo.png -o out.png -k swirl --intensity 80
  nodefx edges photo.png -o out.png -a canny --threshold 0.3
  nodefx blend base.png top.png -o out.png -m soft_light --opacity 0.7
  nodefx halftone photo.png -o out.png -e floyd_steinberg
  nodefx scale photo.png -o out.png --megapixels 1.0 --multiple 64
  nodefx crop photo.png -o out.png --x 10 --y 10 --width 256
  nodefx texture -o nebula.png --seed 42 --color-mode plasma
  nodefx grade photo.png -o out.png --preset look.yaml
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Color grade
    Grade(GradeArgs),

    /// Distortion effects
    Distort(DistortArgs),

    /// Edge detection
    Edges(EdgesArgs),

    /// Blend two images
    Blend(BlendArgs),

    /// Halftone and dithering
    Halftone(HalftoneArgs),

    /// Scale to a megapixel budget
    Scale(ScaleArgs),

    /// Crop image
    Crop(CropArgs),

    /// Generate a procedural texture
    Texture(TextureArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Show min/max/mean per channel
    #[arg(short, long)]
    stats: bool,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct GradeArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML/JSON file with grade parameters
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Invert before grading
    #[arg(long)]
    invert: bool,

    /// Exposure in stops [-2, 2]
    #[arg(long, allow_hyphen_values = true)]
    exposure: Option<f32>,

    /// Temperature [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f32>,

    /// Tint [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    tint: Option<f32>,

    /// Highlights [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    highlights: Option<f32>,

    /// Shadows [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    shadows: Option<f32>,

    /// Blacks [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    blacks: Option<f32>,

    /// Whites [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    whites: Option<f32>,

    /// Contrast [0, 2]
    #[arg(long)]
    contrast: Option<f32>,

    /// Brightness [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<f32>,

    /// Hue rotation in degrees [-180, 180]
    #[arg(long, allow_hyphen_values = true)]
    hue: Option<f32>,

    /// Saturation [0, 2]
    #[arg(long)]
    saturation: Option<f32>,
}

#[derive(Args)]
struct DistortArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML/JSON file with distortion parameters
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Effect: wave, swirl, kaleidoscope, pixelSort, displacement, fisheye,
    /// ripple, twist, spherize, glitch, mosaic, warp
    #[arg(short, long)]
    kind: Option<DistortKind>,

    /// Intensity [0, 100]
    #[arg(long)]
    intensity: Option<f32>,

    /// Frequency [0, 100]
    #[arg(long)]
    frequency: Option<f32>,

    /// Horizontal center offset, percent [-50, 50]
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f32>,

    /// Vertical center offset, percent [-50, 50]
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f32>,

    /// Seed for noise-driven effects
    #[arg(long)]
    seed: Option<u32>,
}

#[derive(Args)]
struct EdgesArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML/JSON file with edge parameters
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Algorithm: sobel, prewitt, scharr, roberts, laplacian, canny
    #[arg(short, long)]
    algorithm: Option<EdgeAlgorithm>,

    /// Threshold [0, 1]
    #[arg(long)]
    threshold: Option<f32>,

    /// Line thickness [1, 5]
    #[arg(long)]
    thickness: Option<u32>,

    /// White edges on black
    #[arg(long)]
    invert: bool,

    /// Edge color R,G,B in [0, 1]
    #[arg(long)]
    edge_color: Option<String>,

    /// Background color R,G,B in [0, 1]
    #[arg(long)]
    background_color: Option<String>,
}

#[derive(Args)]
struct BlendArgs {
    /// Base image
    base: PathBuf,

    /// Overlay image (resampled to the base size if needed)
    overlay: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML/JSON file with blend parameters
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Blend mode: normal, multiply, screen, overlay, soft_light, hard_light,
    /// color_dodge, color_burn, darken, lighten, difference, exclusion, add, subtract
    #[arg(short, long)]
    mode: Option<BlendMode>,

    /// Opacity [0, 1]
    #[arg(long)]
    opacity: Option<f32>,

    /// Grayscale mask image
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Invert the mask
    #[arg(long)]
    invert_mask: bool,
}

#[derive(Args)]
struct HalftoneArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML/JSON file with halftone parameters
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Effect: halftone_dots, halftone_lines, bayer_dithering, ordered_dithering,
    /// floyd_steinberg, newspaper, crosshatch
    #[arg(short, long)]
    effect: Option<HalftoneEffect>,

    /// Cell size in pixels [2, 20]
    #[arg(long)]
    dot_size: Option<u32>,

    /// Screen angle in degrees [0, 360]
    #[arg(long)]
    angle: Option<f32>,

    /// Sharpness [0.1, 2]
    #[arg(long)]
    sharpness: Option<f32>,

    /// Contrast [0.5, 2]
    #[arg(long)]
    contrast: Option<f32>,

    /// Ink in the source color
    #[arg(long)]
    colorize: bool,
}

#[derive(Args)]
struct ScaleArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML/JSON file with scale parameters
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Target megapixels [0.01, 16]
    #[arg(long)]
    megapixels: Option<f32>,

    /// Snap both dimensions to this multiple [1, 512]
    #[arg(long)]
    multiple: Option<u32>,

    /// Width multiple (overrides --multiple)
    #[arg(long)]
    width_multiple: Option<u32>,

    /// Height multiple (overrides --multiple)
    #[arg(long)]
    height_multiple: Option<u32>,

    /// Derive sides from the aspect ratio instead of a uniform scale
    #[arg(long)]
    no_keep_aspect: bool,

    /// Filter: nearest-exact, bilinear, area, bicubic, lanczos
    #[arg(short, long)]
    filter: Option<Filter>,
}

#[derive(Args)]
struct CropArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Crop request as JSON, e.g. '{"x":10,"y":20,"width":100}'
    #[arg(long, conflicts_with_all = ["x", "y", "width", "height"])]
    crop_data: Option<String>,

    /// Left edge
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    x: i64,

    /// Top edge
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    y: i64,

    /// Width (default: to the right edge)
    #[arg(long)]
    width: Option<i64>,

    /// Height (default: to the bottom edge)
    #[arg(long)]
    height: Option<i64>,
}

#[derive(Args)]
struct TextureArgs {
    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML/JSON file with texture parameters
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Width [64, 4096]
    #[arg(long)]
    width: Option<u32>,

    /// Height [64, 4096]
    #[arg(long)]
    height: Option<u32>,

    /// Seed
    #[arg(long)]
    seed: Option<u32>,

    /// Noise scale [0.001, 0.05]
    #[arg(long)]
    scale: Option<f32>,

    /// Octaves [1, 8]
    #[arg(long)]
    octaves: Option<u32>,

    /// Color mode: custom, rainbow, spectrum, radial, angular, gradient, dual, plasma
    #[arg(long)]
    color_mode: Option<ColorMode>,

    /// Noise type: perlin, simplex, ridged, billow, turbulence
    #[arg(long)]
    noise_type: Option<NoiseType>,

    /// Domain warp strength [0, 2]
    #[arg(long)]
    warp: Option<f32>,

    /// Star density [0, 0.01]
    #[arg(long)]
    stars: Option<f32>,

    /// Enable vignette
    #[arg(long)]
    vignette: bool,

    /// Enable bloom
    #[arg(long)]
    bloom: bool,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Grade(args) => commands::grade::run(args),
        Commands::Distort(args) => commands::distort::run(args),
        Commands::Edges(args) => commands::edges::run(args),
        Commands::Blend(args) => commands::blend::run(args),
        Commands::Halftone(args) => commands::halftone::run(args),
        Commands::Scale(args) => commands::scale::run(args),
        Commands::Crop(args) => commands::crop::run(args),
        Commands::Texture(args) => commands::texture::run(args),
    }
}
