use std::path::PathBuf;

use thiserror::Error;

use crate::pyramid::FileFailure;

#[derive(Error, Debug)]
pub enum MonwatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unreadable source {}: {reason}", .path.display())]
    UnreadableSource { path: PathBuf, reason: String },

    #[error("Unsupported raster layout: {0}")]
    UnsupportedLayout(String),

    #[error("No TIFF found in {}", .0.display())]
    NoSourceFound(PathBuf),

    #[error("All {} source file(s) failed", .failures.len())]
    PartialFailure { failures: Vec<FileFailure> },

    #[error("Cache job cancelled")]
    JobCancelled,

    #[error("Directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("No cached level for {base_name} at x{scale}")]
    NotFound { base_name: String, scale: String },

    #[error("Cache job {job} cannot go from {from} to {to}")]
    InvalidTransition {
        job: u64,
        from: &'static str,
        to: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl MonwatchError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonwatchError>;
