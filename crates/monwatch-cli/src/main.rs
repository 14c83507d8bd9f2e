mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "monwatch", about = "Pyramid cache and level-of-detail viewer core for large TIFF rasters")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the pyramid cache for a directory or a single TIFF
    Build(commands::build::BuildArgs),
    /// Show TIFF header metadata
    Info(commands::info::InfoArgs),
    /// List cached pyramid levels
    Levels(commands::levels::LevelsArgs),
    /// Load the original source at the viewport budget
    Original(commands::original::OriginalArgs),
    /// Replay zoom, pan and quality gestures against a cached source
    Navigate(commands::navigate::NavigateArgs),
    /// Print or save the default configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Build(args) => commands::build::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Levels(args) => commands::levels::run(args),
        Commands::Original(args) => commands::original::run(args),
        Commands::Navigate(args) => commands::navigate::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
