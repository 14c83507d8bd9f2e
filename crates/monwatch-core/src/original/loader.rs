use std::path::{Path, PathBuf};
use std::sync::mpsc;

use tracing::{debug, info};

use crate::consts::DEFAULT_DETAIL_HEADROOM;
use crate::error::Result;
use crate::geometry::ViewportSize;
use crate::raster::{normalize, CanonicalImage};

/// The original source, decoded and fitted to the viewport budget.
#[derive(Clone, Debug)]
pub struct OriginalImage {
    pub image: CanonicalImage,
    pub source_width: u32,
    pub source_height: u32,
    /// Divisor applied to the source dimensions; 1.0 if not downscaled.
    pub downscale: f64,
}

impl OriginalImage {
    /// Resolution of the loaded buffer relative to the source.
    pub fn effective_scale(&self) -> f64 {
        1.0 / self.downscale
    }
}

/// `max(w / vw, h / vh) / headroom`. Values at or below 1 mean no downscale.
pub fn downscale_factor(width: u32, height: u32, viewport: ViewportSize, headroom: f64) -> f64 {
    let ratio_w = f64::from(width) / f64::from(viewport.width.max(1));
    let ratio_h = f64::from(height) / f64::from(viewport.height.max(1));
    ratio_w.max(ratio_h) / headroom
}

pub fn load_original(path: &Path, viewport: ViewportSize) -> Result<OriginalImage> {
    load_original_with(path, viewport, DEFAULT_DETAIL_HEADROOM)
}

/// Decode `path` and downscale it by [`downscale_factor`] if that exceeds 1.
pub fn load_original_with(
    path: &Path,
    viewport: ViewportSize,
    headroom: f64,
) -> Result<OriginalImage> {
    info!("Loading original {}", path.display());
    let canonical = normalize(path)?;
    let (source_width, source_height) = (canonical.width(), canonical.height());
    let factor = downscale_factor(source_width, source_height, viewport, headroom);

    if factor > 1.0 {
        let w = ((f64::from(source_width) / factor) as u32).max(1);
        let h = ((f64::from(source_height) / factor) as u32).max(1);
        debug!("Downscaling original {source_width}x{source_height} by {factor:.3} to {w}x{h}");
        Ok(OriginalImage {
            image: canonical.resized(w, h),
            source_width,
            source_height,
            downscale: factor,
        })
    } else {
        Ok(OriginalImage {
            image: canonical,
            source_width,
            source_height,
            downscale: 1.0,
        })
    }
}

/// Run [`load_original_with`] on a background thread.
///
/// The receiver yields exactly one result.
pub fn spawn_original_load(
    path: PathBuf,
    viewport: ViewportSize,
    headroom: f64,
) -> Result<mpsc::Receiver<Result<OriginalImage>>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("monwatch-original".into())
        .spawn(move || {
            let _ = tx.send(load_original_with(&path, viewport, headroom));
        })?;
    Ok(rx)
}
