//! Durable storage of pyramid artifacts.
//!
//! The index is a pure naming convention over the cache directory:
//! `{base}_x{scale}.png`. Artifacts only ever appear under that name through
//! an atomic rename, so an existence check never observes a partial file.

mod artifact;
mod index;

pub use artifact::{artifact_dimensions, load_artifact, write_png_atomic};
pub use index::{artifact_file_name, CacheEntry, CacheIndex};
