use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{load_artifact, CacheEntry, CacheIndex};
use crate::config::ViewportConfig;
use crate::consts::QUALITY_SLIDER_DIVISOR;
use crate::error::{MonwatchError, Result};
use crate::geometry::ViewPoint;
use crate::pyramid::PyramidScale;
use crate::raster::CanonicalImage;

use super::state::{BackingScale, ViewportState};
use super::transform::{AnchorTransform, Placement, QualityOutcome, ZoomOutcome};

/// Map a quality slider position onto a pyramid level.
///
/// `min(floor(percent / 33.34), 2)` indexes `[0.25, 0.5, 1.0]`, so 33 still
/// selects the quarter level.
pub fn quality_to_scale(percent: u8) -> PyramidScale {
    let index = (f64::from(percent.min(100)) / QUALITY_SLIDER_DIVISOR).floor() as usize;
    PyramidScale::ASCENDING[index.min(PyramidScale::ASCENDING.len() - 1)]
}

/// Owns the view state of one open image and decides what backs it.
pub struct LodController {
    defaults: ViewportConfig,
    state: ViewportState,
    base_name: Option<String>,
    buffer: Option<Arc<CanonicalImage>>,
}

impl LodController {
    pub fn new(config: ViewportConfig) -> Self {
        let state = ViewportState::new(&config);
        Self {
            defaults: config,
            state,
            base_name: None,
            buffer: None,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn is_using_original(&self) -> bool {
        self.state.using_original
    }

    pub fn base_name(&self) -> Option<&str> {
        self.base_name.as_deref()
    }

    pub fn current_buffer(&self) -> Option<&Arc<CanonicalImage>> {
        self.buffer.as_ref()
    }

    /// Start a new session for `base_name`, discarding all view state.
    pub fn begin_session(&mut self, base_name: &str) {
        self.state = ViewportState::new(&self.defaults);
        self.base_name = Some(base_name.to_string());
        self.buffer = None;
    }

    /// The level a new session should open with: full resolution if cached,
    /// otherwise the nearest lesser level.
    pub fn select_initial_level(&self, index: &CacheIndex, base_name: &str) -> Result<CacheEntry> {
        std::iter::once(PyramidScale::Full)
            .chain(PyramidScale::Full.lesser())
            .find_map(|scale| index.lookup(base_name, scale).ok())
            .ok_or_else(|| MonwatchError::NotFound {
                base_name: base_name.to_string(),
                scale: PyramidScale::Full.suffix().to_string(),
            })
    }

    /// Begin a session for `base_name` and show its initial level.
    ///
    /// On failure the previous session is left untouched.
    pub fn open_initial_level(
        &mut self,
        index: &CacheIndex,
        base_name: &str,
    ) -> Result<AnchorTransform> {
        let entry = self.select_initial_level(index, base_name)?;
        let image = load_artifact(&entry.path)?;
        self.begin_session(base_name);
        self.state.quality_percent = match entry.scale {
            PyramidScale::Full => 100,
            PyramidScale::Half => 50,
            PyramidScale::Quarter => 0,
        };
        info!("Opened {} at x{}", base_name, entry.scale);
        Ok(self.swap_backing(BackingScale::Level(entry.scale), image))
    }

    /// Apply a multiplicative zoom gesture.
    ///
    /// Crossing the promotion threshold upward while a cached level backs the
    /// view leaves the state unchanged and asks for promotion instead.
    pub fn on_zoom_delta(&mut self, factor: f64) -> ZoomOutcome {
        if !(factor.is_finite() && factor > 0.0) {
            return ZoomOutcome::Applied(self.state.zoom);
        }
        let current = self.state.zoom;
        let requested = current * factor;
        let threshold = self.state.promotion_threshold;

        if !self.state.using_original
            && self.buffer.is_some()
            && current < threshold
            && requested >= threshold
        {
            debug!("Zoom {current:.3} -> {requested:.3} crosses promotion threshold");
            return ZoomOutcome::PromotionRequested {
                current_zoom: current,
                requested_zoom: requested,
            };
        }

        self.state.zoom = self.state.clamp_zoom(requested);
        ZoomOutcome::Applied(self.state.zoom)
    }

    /// Zoom by `steps` wheel notches; negative steps zoom out.
    pub fn on_wheel(&mut self, steps: i32) -> ZoomOutcome {
        if steps == 0 {
            return ZoomOutcome::Applied(self.state.zoom);
        }
        self.on_zoom_delta(self.defaults.wheel_step.powi(steps))
    }

    /// Move the view by a screen-space delta.
    pub fn on_pan(&mut self, dx: f64, dy: f64) -> ViewPoint {
        let zoom = self.state.zoom;
        self.state.center.x -= dx / zoom;
        self.state.center.y -= dy / zoom;
        self.state.center
    }

    pub fn set_view_center(&mut self, center: ViewPoint) {
        self.state.center = center;
    }

    /// Show the level mapped from `percent`, leaving original mode.
    ///
    /// The artifact is loaded before any state changes, so a failed load keeps
    /// the current view.
    pub fn on_quality_slider_change(
        &mut self,
        percent: u8,
        index: &CacheIndex,
    ) -> Result<QualityOutcome> {
        let percent = percent.min(100);
        let scale = quality_to_scale(percent);

        let Some(base_name) = self.base_name.clone() else {
            self.state.quality_percent = percent;
            return Ok(QualityOutcome::Unchanged { scale });
        };
        if !self.state.using_original && self.state.backing == Some(BackingScale::Level(scale)) {
            self.state.quality_percent = percent;
            return Ok(QualityOutcome::Unchanged { scale });
        }

        let entry = index.lookup(&base_name, scale)?;
        let image = load_artifact(&entry.path)?;
        self.leave_original();
        self.state.quality_percent = percent;
        let transform = self.swap_backing(BackingScale::Level(scale), image);
        Ok(QualityOutcome::Swapped { scale, transform })
    }

    /// Nudge the quality slider by `delta` percent.
    pub fn adjust_quality(&mut self, delta: i32, index: &CacheIndex) -> Result<QualityOutcome> {
        let percent = (i32::from(self.state.quality_percent) + delta).clamp(0, 100) as u8;
        self.on_quality_slider_change(percent, index)
    }

    /// Replace the backing buffer, keeping the centered region in place.
    pub fn swap_backing(&mut self, scale: BackingScale, image: CanonicalImage) -> AnchorTransform {
        let buffer = Arc::new(image);
        let placement = match self.state.backing {
            Some(old) if self.buffer.is_some() => {
                let old_factor = old.factor();
                debug_assert!(old_factor > 0.0, "backing scale must be positive");
                let ratio = scale.factor() / old_factor;
                self.state.zoom *= ratio;
                self.state.center = self.state.center.scaled(ratio);
                Placement::Anchored {
                    zoom: self.state.zoom,
                    center: self.state.center,
                }
            }
            _ => {
                self.state.zoom = 1.0;
                self.state.center = buffer_center(&buffer);
                Placement::Fit
            }
        };
        debug!(
            "Backing now {scale} ({}x{}), zoom {:.3}",
            buffer.width(),
            buffer.height(),
            self.state.zoom
        );
        self.state.backing = Some(scale);
        self.buffer = Some(Arc::clone(&buffer));
        AnchorTransform {
            buffer,
            scale,
            placement,
        }
    }

    /// Back the view with the original source after a confirmed promotion.
    ///
    /// `effective_scale` is the loaded buffer's resolution relative to the source.
    pub fn promote(&mut self, image: CanonicalImage, effective_scale: f64) -> AnchorTransform {
        self.state.max_zoom = self.defaults.original_max_zoom;
        let transform = self.swap_backing(
            BackingScale::Original {
                effective: effective_scale,
            },
            image,
        );
        self.state.using_original = true;
        info!("Promoted to original source (x{effective_scale:.3})");
        transform
    }

    /// Clamp zoom to just below the promotion threshold after the user declined.
    pub fn decline_promotion(&mut self) -> f64 {
        let target = self.state.promotion_threshold - self.defaults.decline_margin;
        self.state.zoom = self.state.clamp_zoom(target);
        self.state.zoom
    }

    /// Fit the current buffer, reset zoom to 1.0 and leave original mode.
    pub fn reset_view(&mut self) -> Option<AnchorTransform> {
        let buffer = Arc::clone(self.buffer.as_ref()?);
        let scale = self.state.backing?;
        self.leave_original();
        self.state.zoom = 1.0;
        self.state.center = buffer_center(&buffer);
        Some(AnchorTransform {
            buffer,
            scale,
            placement: Placement::Fit,
        })
    }

    /// Restore the cached-level zoom ceiling. The zoom itself is left for the
    /// following swap to rescale and the next gesture to clamp.
    fn leave_original(&mut self) {
        self.state.using_original = false;
        self.state.max_zoom = self.defaults.max_zoom;
    }
}

fn buffer_center(buffer: &CanonicalImage) -> ViewPoint {
    ViewPoint::new(
        f64::from(buffer.width()) / 2.0,
        f64::from(buffer.height()) / 2.0,
    )
}
