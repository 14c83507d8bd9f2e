use std::path::{Path, PathBuf};

use super::scale::PyramidScale;

/// A persisted pyramid artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct PyramidLevel {
    pub base_name: String,
    pub scale: PyramidScale,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// A source file that could not be cached.
#[derive(Clone, Debug, PartialEq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy());
        write!(f, "{name}: {}", self.reason)
    }
}

/// Outcome of a batch build that did not fail outright.
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    /// Every artifact written, in build order.
    pub levels: Vec<PyramidLevel>,
    /// Sources whose full ladder was written.
    pub succeeded: Vec<PathBuf>,
    /// Per-file failures; siblings were still processed.
    pub failures: Vec<FileFailure>,
    /// The build stopped early because cancellation was requested.
    pub cancelled: bool,
    /// Line-oriented log of everything the build did.
    pub log: Vec<String>,
}

impl BuildReport {
    pub fn is_partial_failure(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn levels_for<'a>(&'a self, source: &'a Path) -> impl Iterator<Item = &'a PyramidLevel> {
        let base = crate::raster::base_name(source);
        self.levels.iter().filter(move |l| l.base_name == base)
    }
}

/// Observer of a pyramid build, also consulted for cooperative cancellation.
///
/// All methods have no-op defaults.
pub trait BuildReporter: Send + Sync {
    /// A source file is about to be processed.
    fn begin_source(&self, _path: &Path, _index: usize, _total: usize) {}

    /// One artifact has been atomically written.
    fn level_written(&self, _level: &PyramidLevel) {}

    /// A progress line, as captured in [`BuildReport::log`].
    fn line(&self, _line: &str) {}

    /// Checked between source files, never mid-resize.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Reporter used when nobody is listening.
pub struct NoOpReporter;
impl BuildReporter for NoOpReporter {}
