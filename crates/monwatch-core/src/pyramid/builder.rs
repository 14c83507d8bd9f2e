use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::cache::{write_png_atomic, CacheIndex};
use crate::consts::SOURCE_EXTENSIONS;
use crate::error::{MonwatchError, Result};
use crate::raster::{base_name, normalize};

use super::scale::PyramidScale;
use super::types::{BuildReport, BuildReporter, FileFailure, NoOpReporter, PyramidLevel};

/// `true` for files with a `.tif`/`.tiff` extension (any case).
pub fn is_source_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                SOURCE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
}

/// Source rasters directly inside `dir`, sorted by file name.
pub fn list_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MonwatchError::DirectoryMissing(dir.to_path_buf()));
    }
    let mut sources = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if is_source_file(&path) {
            sources.push(path);
        }
    }
    sources.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sources)
}

/// Batch builder writing the fixed scale ladder for every source in a directory.
pub struct PyramidCacheBuilder {
    input_dir: PathBuf,
    index: CacheIndex,
}

impl PyramidCacheBuilder {
    /// Fails if `input_dir` does not exist; creates `cache_dir` if needed.
    pub fn new(input_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let input_dir = input_dir.into();
        if !input_dir.is_dir() {
            return Err(MonwatchError::DirectoryMissing(input_dir));
        }
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            input_dir,
            index: CacheIndex::new(cache_dir),
        })
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn index(&self) -> &CacheIndex {
        &self.index
    }

    pub fn build(&self) -> Result<BuildReport> {
        self.build_reported(&NoOpReporter)
    }

    /// Build every source in the input directory.
    ///
    /// Per-file failures are recorded and the batch continues. The batch is an
    /// error only when no source exists or when every source failed.
    pub fn build_reported(&self, reporter: &dyn BuildReporter) -> Result<BuildReport> {
        let sources = list_sources(&self.input_dir)?;
        if sources.is_empty() {
            return Err(MonwatchError::NoSourceFound(self.input_dir.clone()));
        }

        let mut report = BuildReport::default();
        let emit = |report: &mut BuildReport, line: String| {
            reporter.line(&line);
            report.log.push(line);
        };

        let total = sources.len();
        for (i, source) in sources.iter().enumerate() {
            if reporter.is_cancelled() {
                info!("Build cancelled before {}", source.display());
                report.cancelled = true;
                break;
            }
            reporter.begin_source(source, i, total);
            let name = display_name(source);
            emit(&mut report, format!("[INFO] Processing {name}"));

            match self.build_source(source, reporter) {
                Ok(levels) => {
                    for level in &levels {
                        emit(
                            &mut report,
                            format!("[INFO] Saved cached image: {}", level.path.display()),
                        );
                    }
                    report.levels.extend(levels);
                    report.succeeded.push(source.clone());
                }
                Err(e) => {
                    error!("{name}: {e}");
                    let failure = FileFailure {
                        path: source.clone(),
                        reason: e.to_string(),
                    };
                    emit(&mut report, format!("[ERROR] {failure}"));
                    report.failures.push(failure);
                }
            }
        }

        if !report.cancelled && report.succeeded.is_empty() {
            return Err(MonwatchError::PartialFailure {
                failures: report.failures,
            });
        }
        Ok(report)
    }

    /// Normalize one source and write its full ladder, full resolution first.
    ///
    /// Artifacts already renamed into place stay valid if a later level fails.
    pub fn build_source(
        &self,
        source: &Path,
        reporter: &dyn BuildReporter,
    ) -> Result<Vec<PyramidLevel>> {
        let canonical = normalize(source)?;
        let base = base_name(source);
        let (width, height) = (canonical.width(), canonical.height());

        let mut levels = Vec::with_capacity(PyramidScale::LADDER.len());
        for scale in PyramidScale::LADDER {
            let (w, h) = scale.dimensions(width, height);
            let path = self.index.artifact_path(&base, scale);
            if scale == PyramidScale::Full {
                write_png_atomic(&canonical, &path)?;
            } else {
                write_png_atomic(&canonical.resized(w, h), &path)?;
            }
            debug!("Wrote {} ({w}x{h})", path.display());
            let level = PyramidLevel {
                base_name: base.clone(),
                scale,
                path,
                width: w,
                height: h,
            };
            reporter.level_written(&level);
            levels.push(level);
        }
        Ok(levels)
    }
}

/// Build the pyramid cache for every source in `input_dir`.
pub fn build_pyramid_cache(input_dir: &Path, cache_dir: &Path) -> Result<BuildReport> {
    PyramidCacheBuilder::new(input_dir, cache_dir)?.build()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
