use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use monwatch_core::cache::{artifact_dimensions, CacheIndex};

#[derive(Args)]
pub struct LevelsArgs {
    /// Source base name; lists every cached source if omitted
    pub base: Option<String>,

    /// Cache directory
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &LevelsArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let cache_dir = args
        .cache
        .clone()
        .unwrap_or_else(|| config.paths.cache_dir.clone());
    let index = CacheIndex::new(cache_dir);

    let bases = match args.base {
        Some(ref base) => vec![base.clone()],
        None => index.sources()?,
    };
    if bases.is_empty() {
        println!("No cached sources in {}", index.cache_dir().display());
        return Ok(());
    }

    for base in &bases {
        println!("{base}");
        let levels = index.levels(base);
        if levels.is_empty() {
            println!("  (not cached)");
        }
        for level in levels {
            let dims = artifact_dimensions(&level.path)
                .map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_else(|_| "?".into());
            println!(
                "  x{:<6}{:<14}{}",
                level.scale.suffix(),
                dims,
                level.path.display()
            );
        }
    }

    Ok(())
}
