mod builder;
mod scale;
mod types;

pub use builder::{build_pyramid_cache, is_source_file, list_sources, PyramidCacheBuilder};
pub use scale::PyramidScale;
pub use types::{BuildReport, BuildReporter, FileFailure, NoOpReporter, PyramidLevel};
