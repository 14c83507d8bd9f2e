//! Level-of-detail selection for the interactive view.
//!
//! [`LodController`] owns the [`ViewportState`] of one open image session. It
//! decides which cached pyramid level (or the original source) backs the view
//! and produces an [`AnchorTransform`] whenever the backing buffer changes.
//!
//! ## Anchor preservation
//!
//! Zoom factors and view centers are tracked relative to the current backing
//! buffer. When the backing changes from scale `s_old` to `s_new` the ratio
//! `r = s_new / s_old` is applied to both:
//!
//! ```text
//! center_new = center_old * r
//! zoom_new   = zoom_old * r
//! ```
//!
//! so the same region of the image stays centered. Swapping A to B and back
//! to A multiplies by `r` and `1/r` and returns to the starting state.
//!
//! The first buffer of a session is fitted to the viewport at zoom 1.0.

mod controller;
mod state;
mod transform;

pub use controller::{quality_to_scale, LodController};
pub use state::{BackingScale, ViewportState};
pub use transform::{AnchorTransform, Placement, QualityOutcome, ZoomOutcome};
