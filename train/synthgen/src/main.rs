use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use rand::{RngCore, SeedableRng, rngs::SmallRng};
use symbol_layout::{Library, Taxonomy};

use crate::{
    config::{GenCfg, OutputFormat, parse_rgb},
    fonts::FontCache,
    generator::DatasetGenerator,
    render::{Detector, LabelReplay, draw_detections, log_detections},
};

mod config;
mod fonts;
mod generator;
mod io;
mod record;
mod render;

/// Synthetic HVAC/BMS symbol dataset generator
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON config file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate images and YOLO-format label files
    Generate(GenerateArgs),
    /// Print class IDs and names
    Classes,
    /// Draw the boxes of a label file over its image
    Preview(PreviewArgs),
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Directory of labelled symbol images
    #[arg(long)]
    symbols: Option<PathBuf>,

    /// Directory of unlabelled context images
    #[arg(long)]
    contexts: Option<PathBuf>,

    /// Output directory for images
    #[arg(long)]
    out_images: Option<PathBuf>,

    /// Output directory for label files
    #[arg(long)]
    out_labels: Option<PathBuf>,

    /// Number of images to generate
    #[arg(short = 'n', long)]
    num_images: Option<u32>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Background colour (format: "R,G,B")
    #[arg(long, value_parser = parse_rgb)]
    background: Option<[u8; 3]>,

    /// Placement attempts per symbol
    #[arg(long)]
    symbol_tries: Option<u32>,

    /// Placement attempts per context image
    #[arg(long)]
    context_tries: Option<u32>,

    /// Output image format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

impl GenerateArgs {
    fn apply(self, cfg: &mut GenCfg) {
        if let Some(v) = self.symbols {
            cfg.symbols_dir = v;
        }
        if let Some(v) = self.contexts {
            cfg.context_dir = v;
        }
        if let Some(v) = self.out_images {
            cfg.out_images = v;
        }
        if let Some(v) = self.out_labels {
            cfg.out_labels = v;
        }
        if let Some(v) = self.num_images {
            cfg.num_images = v;
        }
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.background {
            cfg.background = v;
        }
        if let Some(v) = self.symbol_tries {
            cfg.symbol_tries = v;
        }
        if let Some(v) = self.context_tries {
            cfg.context_tries = v;
        }
        if let Some(v) = self.format {
            cfg.format = v;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
    }
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Image to annotate
    #[arg(long)]
    image: PathBuf,

    /// Label file with one `class cx cy w h` line per box
    #[arg(long)]
    labels: PathBuf,

    /// Where to write the annotated image
    #[arg(long)]
    out: PathBuf,

    /// Directory with .ttf/.otf fonts for box captions
    #[arg(long, default_value = "assets/fonts")]
    fonts: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => GenCfg::from_json_file(path)?,
        None => GenCfg::default(),
    };
    let taxonomy = Taxonomy::builtin();

    match cli.command {
        Command::Generate(args) => {
            args.apply(&mut cfg);
            generate(&cfg, taxonomy)
        }
        Command::Classes => {
            for (id, name) in taxonomy.names().iter().enumerate() {
                println!("{id} {name}");
            }
            Ok(())
        }
        Command::Preview(args) => preview(&args, taxonomy),
    }
}

fn generate(cfg: &GenCfg, taxonomy: &Taxonomy) -> anyhow::Result<()> {
    cfg.validate()?;

    info!("Loading symbols from {}", cfg.symbols_dir.display());
    let symbols = io::load_symbols(&cfg.symbols_dir, taxonomy)?;
    info!("  {} symbols loaded", symbols.len());
    info!("Loading context images from {}", cfg.context_dir.display());
    let contexts = io::load_contexts(&cfg.context_dir)?;
    info!("  {} context images loaded", contexts.len());

    let library = Library::new(symbols, contexts)
        .with_context(|| format!("no symbols found in {}", cfg.symbols_dir.display()))?;

    let seed = cfg.seed.unwrap_or_else(|| SmallRng::from_os_rng().next_u64());
    info!("Run seed {seed}");

    let mut generator = DatasetGenerator::new(cfg, &library);
    generator.init_output(taxonomy)?;
    let summary = generator.run(seed)?;

    info!(
        "Synthetic dataset generation complete: {} images, {} symbols placed, {} skipped",
        summary.images, summary.placed, summary.skipped
    );
    Ok(())
}

fn preview(args: &PreviewArgs, taxonomy: &Taxonomy) -> anyhow::Result<()> {
    let mut img = image::open(&args.image)
        .with_context(|| format!("opening {}", args.image.display()))?
        .into_rgb8();
    let mut detector = LabelReplay::from_file(&args.labels)?;
    let detections = detector.detect(&img)?;

    let fonts = FontCache::load(&args.fonts);
    if fonts.first().is_none() {
        warn!(
            "No usable fonts in {}, drawing boxes without captions",
            args.fonts.display()
        );
    } else {
        info!("{} caption font(s) in {}", fonts.len(), args.fonts.display());
    }
    draw_detections(&mut img, &detections, taxonomy.names(), fonts.first());
    log_detections(&detections, taxonomy.names());

    img.save(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    info!("Annotated image written to {}", args.out.display());
    Ok(())
}
