//! Source raster access and normalization to canonical 8-bit images.

mod canonical;
mod decode;
mod normalize;

pub use canonical::{resize_lanczos, CanonicalImage};
pub use decode::{base_name, probe, read_raw, RawRaster, SampleBuffer, SampleType, SourceRaster};
pub use normalize::{normalize, normalize_raw, rescale_to_u8};
