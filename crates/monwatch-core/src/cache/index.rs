use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::consts::{ARTIFACT_EXTENSION, LEGACY_FULL_SUFFIX};
use crate::error::{MonwatchError, Result};
use crate::pyramid::PyramidScale;

/// A cached artifact visible to readers.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub base_name: String,
    pub scale: PyramidScale,
    pub path: PathBuf,
}

/// `{base}_x{scale}.png`.
pub fn artifact_file_name(base_name: &str, scale: PyramidScale) -> String {
    format!("{base_name}_x{}.{ARTIFACT_EXTENSION}", scale.suffix())
}

/// Maps (source base name, scale) to artifact paths inside one cache directory.
#[derive(Clone, Debug)]
pub struct CacheIndex {
    cache_dir: PathBuf,
}

impl CacheIndex {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the artifact for (base, scale) lives, whether or not it exists yet.
    pub fn artifact_path(&self, base_name: &str, scale: PyramidScale) -> PathBuf {
        self.cache_dir.join(artifact_file_name(base_name, scale))
    }

    pub fn exists(&self, base_name: &str, scale: PyramidScale) -> bool {
        self.resolve(base_name, scale).is_some()
    }

    pub fn lookup(&self, base_name: &str, scale: PyramidScale) -> Result<CacheEntry> {
        self.resolve(base_name, scale)
            .map(|path| CacheEntry {
                base_name: base_name.to_string(),
                scale,
                path,
            })
            .ok_or_else(|| MonwatchError::NotFound {
                base_name: base_name.to_string(),
                scale: scale.suffix().to_string(),
            })
    }

    fn resolve(&self, base_name: &str, scale: PyramidScale) -> Option<PathBuf> {
        let path = self.artifact_path(base_name, scale);
        if path.is_file() {
            return Some(path);
        }
        if scale == PyramidScale::Full {
            let legacy = self
                .cache_dir
                .join(format!("{base_name}{LEGACY_FULL_SUFFIX}.{ARTIFACT_EXTENSION}"));
            if legacy.is_file() {
                return Some(legacy);
            }
        }
        None
    }

    /// Every cached level of a source, full resolution first.
    pub fn levels(&self, base_name: &str) -> Vec<CacheEntry> {
        PyramidScale::LADDER
            .into_iter()
            .filter_map(|scale| self.lookup(base_name, scale).ok())
            .collect()
    }

    /// Base names with at least one canonical artifact, sorted.
    pub fn sources(&self) -> Result<Vec<String>> {
        if !self.cache_dir.is_dir() {
            return Err(MonwatchError::DirectoryMissing(self.cache_dir.clone()));
        }
        let mut names = BTreeSet::new();
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if let Some((base, _)) = parse_artifact_name(&path) {
                names.insert(base);
            }
        }
        Ok(names.into_iter().collect())
    }

    /// `true` if any cached level of `base_name` predates the source's modification time.
    pub fn is_stale(&self, base_name: &str, source_modified: SystemTime) -> bool {
        let levels = self.levels(base_name);
        levels.is_empty()
            || levels.iter().any(|entry| {
                std::fs::metadata(&entry.path)
                    .and_then(|m| m.modified())
                    .map(|written| written < source_modified)
                    .unwrap_or(true)
            })
    }
}

fn parse_artifact_name(path: &Path) -> Option<(String, PyramidScale)> {
    if path.extension()?.to_str()? != ARTIFACT_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (base, suffix) = stem.rsplit_once("_x")?;
    let scale = PyramidScale::from_suffix(suffix)?;
    (!base.is_empty()).then(|| (base.to_string(), scale))
}
