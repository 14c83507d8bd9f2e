use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use monwatch_core::cache::write_png_atomic;
use monwatch_core::geometry::ViewportSize;
use monwatch_core::original::{spawn_original_load, PromotionGate, PromotionRequest};
use monwatch_core::raster::probe;

use super::PromptGate;

#[derive(Args)]
pub struct OriginalArgs {
    /// Source TIFF file
    pub file: PathBuf,

    /// Viewport size the load is budgeted against
    #[arg(long, default_value = "1280x800")]
    pub viewport: ViewportSize,

    /// Target resolution in multiples of the viewport
    #[arg(long)]
    pub headroom: Option<f64>,

    /// Save the loaded image as PNG
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run(args: &OriginalArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let headroom = args.headroom.unwrap_or(config.original.detail_headroom);
    if !(headroom > 0.0) {
        bail!("--headroom must be positive");
    }

    let request = PromotionRequest {
        source: args.file.clone(),
        requested_zoom: config.viewport.promotion_threshold,
        estimated_bytes: probe(&args.file).ok().map(|s| s.canonical_bytes()),
    };
    let mut gate = PromptGate::from_flags(args.yes, false);
    if !gate.confirm(&request) {
        println!("Not loading {}", args.file.display());
        return Ok(());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    pb.set_message(format!("Loading original {}", args.file.display()));
    pb.enable_steady_tick(Duration::from_millis(120));

    let rx = spawn_original_load(args.file.clone(), args.viewport, headroom)?;
    let loaded = rx.recv().context("Original loader exited without a result")?;
    pb.finish_and_clear();
    let original = loaded?;

    println!(
        "Source:      {}x{}",
        original.source_width, original.source_height
    );
    println!(
        "Loaded:      {}x{}",
        original.image.width(),
        original.image.height()
    );
    println!("Downscale:   {:.3}", original.downscale);

    if let Some(ref path) = args.output {
        write_png_atomic(&original.image, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
