use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::geometry::ViewportSize;
use crate::lod::{AnchorTransform, LodController};
use crate::raster::probe;

use super::loader::load_original_with;

/// What the user is asked to confirm before the original is loaded.
#[derive(Clone, Debug)]
pub struct PromotionRequest {
    pub source: PathBuf,
    pub requested_zoom: f64,
    /// Decoded size of the full source, if its header could be read.
    pub estimated_bytes: Option<u64>,
}

impl PromotionRequest {
    pub const MESSAGE: &'static str = "Are you sure your PC can handle loading the full TIFF?";

    pub fn message(&self) -> &'static str {
        Self::MESSAGE
    }
}

/// Synchronous yes/no confirmation, asked exactly once per promotion attempt.
pub trait PromotionGate {
    fn confirm(&mut self, request: &PromotionRequest) -> bool;
}

impl<F> PromotionGate for F
where
    F: FnMut(&PromotionRequest) -> bool,
{
    fn confirm(&mut self, request: &PromotionRequest) -> bool {
        self(request)
    }
}

#[derive(Clone, Debug)]
pub enum PromotionResult {
    Promoted(AnchorTransform),
    /// The user said no; zoom was clamped just below the threshold.
    Declined { zoom: f64 },
}

/// Handle a `PromotionRequested` outcome.
///
/// On confirmation the original is loaded and swapped in; a failed load
/// leaves the controller exactly as it was. On refusal nothing is loaded.
pub fn resolve_promotion(
    controller: &mut LodController,
    gate: &mut dyn PromotionGate,
    source: &Path,
    requested_zoom: f64,
    viewport: ViewportSize,
    headroom: f64,
) -> Result<PromotionResult> {
    let request = PromotionRequest {
        source: source.to_path_buf(),
        requested_zoom,
        estimated_bytes: probe(source).ok().map(|s| s.canonical_bytes()),
    };

    if !gate.confirm(&request) {
        let zoom = controller.decline_promotion();
        info!("Promotion declined, zoom clamped to {zoom:.2}");
        return Ok(PromotionResult::Declined { zoom });
    }

    let original = load_original_with(source, viewport, headroom).map_err(|e| {
        warn!("Original load failed: {e}");
        e
    })?;
    let effective = original.effective_scale();
    Ok(PromotionResult::Promoted(
        controller.promote(original.image, effective),
    ))
}
