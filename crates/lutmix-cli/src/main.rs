//! lutmix - stack 3D LUTs on photos
//!
//! Applies an ordered chain of up to five .cube LUTs to a photo, bakes the
//! chain into one merged LUT, and renders per-LUT thumbnails.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::LutSpec;

#[derive(Parser)]
#[command(name = "lutmix")]
#[command(author, version, about = "Stack 3D LUTs on photos")]
#[command(long_about = "
Applies a chain of up to five .cube LUTs to a photo, each blended by its own
intensity, and exports either the edited photo or one merged LUT.

Examples:
  lutmix info look.cube                              # Show LUT info
  lutmix apply photo.jpg -o out.png -l teal.cube:0.8 -l contrast.cube
  lutmix apply photo.jpg -o out.png --chain grade.yaml
  lutmix bake --chain grade.yaml -o merged.cube
  lutmix preview photo.jpg -o frame.png --chain grade.yaml --show-original
  lutmix thumb photo.jpg -l teal.cube -i 0.5 -m 256 -o teal.png
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Display LUT information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Apply a LUT chain to a photo and save the result
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// Bake a LUT chain into one merged .cube file
    #[command(visible_alias = "b")]
    Bake(BakeArgs),

    /// Render the chain through the preview backend
    #[command(visible_alias = "p")]
    Preview(PreviewArgs),

    /// Render a downscaled single-LUT preview
    Thumb(ThumbArgs),
}

/// Chain source shared by `apply` and `bake`.
#[derive(Args)]
struct ChainArgs {
    /// LUT as PATH or PATH:INTENSITY (repeatable, applied in order)
    #[arg(short, long = "lut", value_name = "PATH[:INTENSITY]")]
    luts: Vec<LutSpec>,

    /// YAML chain file
    #[arg(short, long, conflicts_with = "luts")]
    chain: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    /// Input .cube file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Show sample value range
    #[arg(short, long)]
    stats: bool,
}

#[derive(Args)]
struct ApplyArgs {
    /// Input photo
    input: PathBuf,

    /// Output photo
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    chain: ChainArgs,
}

#[derive(Args)]
struct BakeArgs {
    /// Output .cube file
    #[arg(short, long)]
    output: PathBuf,

    /// Grid size of the merged LUT
    #[arg(short, long, default_value_t = lutmix_engine::BAKE_SIZE)]
    size: usize,

    /// TITLE written to the merged LUT
    #[arg(short, long)]
    title: Option<String>,

    #[command(flatten)]
    chain: ChainArgs,
}

#[derive(Args)]
struct PreviewArgs {
    /// Input photo
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Longest side of the preview frame in pixels (0 = full size)
    #[arg(short, long, default_value = "1024")]
    max_side: u32,

    /// Show the original instead of the graded frame
    #[arg(long)]
    show_original: bool,

    #[command(flatten)]
    chain: ChainArgs,
}

#[derive(Args)]
struct ThumbArgs {
    /// Input photo
    input: PathBuf,

    /// LUT to preview
    #[arg(short, long)]
    lut: PathBuf,

    /// LUT intensity (0-1)
    #[arg(short, long, default_value = "1.0")]
    intensity: f32,

    /// Longest side of the thumbnail in pixels
    #[arg(short, long, default_value = "256")]
    max_side: u32,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
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
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Apply(args) => commands::apply::run(args, cli.verbose),
        Commands::Bake(args) => commands::bake::run(args, cli.verbose),
        Commands::Preview(args) => commands::preview::run(args, cli.verbose),
        Commands::Thumb(args) => commands::thumb::run(args, cli.verbose),
    }
}
