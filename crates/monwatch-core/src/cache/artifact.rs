use std::io::{BufWriter, Write};
use std::path::Path;

use image::ImageFormat;
use tempfile::NamedTempFile;

use crate::error::{MonwatchError, Result};
use crate::raster::CanonicalImage;

/// Encode `image` as PNG next to `path` and rename it into place.
///
/// Readers see either the previous artifact or the complete new one.
pub fn write_png_atomic(image: &CanonicalImage, path: &Path) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        image.as_dynamic().write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| MonwatchError::Io(e.error))?;
    Ok(())
}

/// Decode a cached artifact into a canonical image.
pub fn load_artifact(path: &Path) -> Result<CanonicalImage> {
    let image = image::open(path)?;
    Ok(CanonicalImage::from_dynamic(image))
}

/// Dimensions of a cached artifact, read from its header only.
pub fn artifact_dimensions(path: &Path) -> Result<(u32, u32)> {
    Ok(image::image_dimensions(path)?)
}
