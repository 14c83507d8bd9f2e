use std::sync::Arc;

use crate::geometry::ViewPoint;
use crate::pyramid::PyramidScale;
use crate::raster::CanonicalImage;

use super::state::BackingScale;

/// How the presentation layer should place a new backing buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Fit the whole buffer inside the viewport; zoom is 1.0.
    Fit,
    /// Set the absolute zoom and center the view on `center` (buffer pixels).
    Anchored { zoom: f64, center: ViewPoint },
}

/// Instruction to replace the backing buffer of the view.
#[derive(Clone, Debug)]
pub struct AnchorTransform {
    pub buffer: Arc<CanonicalImage>,
    pub scale: BackingScale,
    pub placement: Placement,
}

impl AnchorTransform {
    pub fn zoom(&self) -> f64 {
        match self.placement {
            Placement::Fit => 1.0,
            Placement::Anchored { zoom, .. } => zoom,
        }
    }
}

/// Result of a zoom gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomOutcome {
    /// The zoom was changed (and clamped) to this value.
    Applied(f64),
    /// The gesture would cross the promotion threshold. Nothing was changed;
    /// the caller must confirm before loading the original.
    PromotionRequested {
        current_zoom: f64,
        requested_zoom: f64,
    },
}

/// Result of a quality slider change.
#[derive(Clone, Debug)]
pub enum QualityOutcome {
    /// The mapped level already backs the view.
    Unchanged { scale: PyramidScale },
    Swapped {
        scale: PyramidScale,
        transform: AnchorTransform,
    },
}
