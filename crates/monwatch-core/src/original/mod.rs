//! Loading the uncached source for "original" mode.
//!
//! The source is decoded in full and downscaled to a budget of roughly
//! `detail_headroom` times the viewport's linear resolution. Loading is only
//! ever triggered through [`resolve_promotion`] after a [`PromotionGate`] said yes.

mod loader;
mod promotion;

pub use loader::{
    downscale_factor, load_original, load_original_with, spawn_original_load, OriginalImage,
};
pub use promotion::{resolve_promotion, PromotionGate, PromotionRequest, PromotionResult};
