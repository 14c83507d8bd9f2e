use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use monwatch_core::cache::CacheIndex;
use monwatch_core::raster::probe;

#[derive(Args)]
pub struct InfoArgs {
    /// Input TIFF file
    pub file: PathBuf,

    /// Cache directory to check for existing levels
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = probe(&args.file)?;

    println!("File:        {}", source.path.display());
    println!("Dimensions:  {}x{}", source.width, source.height);
    println!("Channels:    {}", source.channels);
    println!("Bit depth:   {}", source.bits_per_sample);
    println!("Sample type: {}", source.sample_type);
    if source.planar {
        println!("Layout:      separate planes");
    }
    println!("Pages:       {}", source.pages);

    let decoded_mb = source.canonical_bytes() as f64 / (1024.0 * 1024.0);
    println!("Decoded:     {:.1} MB", decoded_mb);

    if let Some(ref cache_dir) = args.cache {
        let index = CacheIndex::new(cache_dir);
        let base = source.base_name();
        let levels = index.levels(&base);
        if levels.is_empty() {
            println!("Cache:       not cached");
        } else {
            let scales: Vec<_> = levels.iter().map(|l| format!("x{}", l.scale)).collect();
            let stale = if index.is_stale(&base, source.modified) {
                " (stale)"
            } else {
                ""
            };
            println!("Cache:       {}{}", scales.join(", "), stale);
        }
    }

    Ok(())
}
