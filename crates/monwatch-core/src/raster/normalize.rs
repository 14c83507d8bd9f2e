use std::path::Path;

use image::{RgbImage, RgbaImage};
use ndarray::{Array3, ArrayView3};
use num_traits::AsPrimitive;
use rayon::prelude::*;
use tracing::debug;

use crate::consts::{PARALLEL_SAMPLE_THRESHOLD, U8_MAX_F64};
use crate::error::{MonwatchError, Result};

use super::canonical::CanonicalImage;
use super::decode::{read_raw, RawRaster, SampleBuffer};

/// Load a source raster and convert it into a canonical 8-bit RGB or RGBA image.
pub fn normalize(path: &Path) -> Result<CanonicalImage> {
    let raw = read_raw(path)?;
    debug!(
        file = %path.display(),
        shape = ?raw.shape(),
        dtype = %raw.sample_type(),
        "Decoded source raster"
    );
    normalize_raw(raw)
}

/// Normalize an already decoded raster.
///
/// Non-8-bit samples are min-max scaled over the whole image (not per
/// channel) and floored to `u8`; a flat image becomes all zeros.
/// Channels-first data is transposed so channels trail. Grayscale is
/// replicated to RGB.
pub fn normalize_raw(raw: RawRaster) -> Result<CanonicalImage> {
    let RawRaster {
        width,
        height,
        channels,
        channels_first,
        samples,
    } = raw;

    if width == 0 || height == 0 {
        return Err(MonwatchError::UnsupportedLayout(format!(
            "empty raster {width}x{height}"
        )));
    }
    if channels_first && !matches!(channels, 3 | 4) {
        return Err(MonwatchError::UnsupportedLayout(format!(
            "{channels} leading channel planes"
        )));
    }

    let bytes = rescale_to_u8(samples);
    let (h, w) = (height as usize, width as usize);

    let interleaved = if channels_first {
        let planar = Array3::from_shape_vec((channels, h, w), bytes)
            .map_err(|e| MonwatchError::UnsupportedLayout(e.to_string()))?;
        channels_last(planar.view())
    } else {
        bytes
    };

    match channels {
        1 => {
            let rgb: Vec<u8> = interleaved.iter().flat_map(|&v| [v, v, v]).collect();
            RgbImage::from_raw(width, height, rgb)
                .map(CanonicalImage::from_rgb)
                .ok_or_else(|| buffer_mismatch(width, height, 1))
        }
        3 => RgbImage::from_raw(width, height, interleaved)
            .map(CanonicalImage::from_rgb)
            .ok_or_else(|| buffer_mismatch(width, height, 3)),
        4 => RgbaImage::from_raw(width, height, interleaved)
            .map(CanonicalImage::from_rgba)
            .ok_or_else(|| buffer_mismatch(width, height, 4)),
        n => Err(MonwatchError::UnsupportedLayout(format!(
            "{n} channels per pixel (expected 1, 3 or 4)"
        ))),
    }
}

fn buffer_mismatch(width: u32, height: u32, channels: usize) -> MonwatchError {
    MonwatchError::UnsupportedLayout(format!(
        "sample buffer does not match {width}x{height}x{channels}"
    ))
}

/// Move the leading channel axis to the end: (c, h, w) -> (h, w, c).
fn channels_last(planar: ArrayView3<'_, u8>) -> Vec<u8> {
    planar.permuted_axes([1, 2, 0]).iter().copied().collect()
}

/// Convert any sample buffer to 8-bit, min-max scaling unless it already is `u8`.
pub fn rescale_to_u8(samples: SampleBuffer) -> Vec<u8> {
    match samples {
        SampleBuffer::U8(v) => v,
        SampleBuffer::U16(v) => min_max_scale(&v),
        SampleBuffer::U32(v) => min_max_scale(&v),
        SampleBuffer::U64(v) => min_max_scale(&v),
        SampleBuffer::I8(v) => min_max_scale(&v),
        SampleBuffer::I16(v) => min_max_scale(&v),
        SampleBuffer::I32(v) => min_max_scale(&v),
        SampleBuffer::I64(v) => min_max_scale(&v),
        SampleBuffer::F32(v) => min_max_scale(&v),
        SampleBuffer::F64(v) => min_max_scale(&v),
    }
}

/// `floor((v - min) / (max - min) * 255)`; all zeros when `max == min`.
fn min_max_scale<T>(samples: &[T]) -> Vec<u8>
where
    T: AsPrimitive<f64> + Send + Sync,
{
    let Some((lo, hi)) = sample_range(samples) else {
        return vec![0; samples.len()];
    };
    let span = hi - lo;
    if span <= 0.0 {
        return vec![0; samples.len()];
    }

    let scale = |v: &T| ((v.as_() - lo) / span * U8_MAX_F64).floor() as u8;
    if samples.len() >= PARALLEL_SAMPLE_THRESHOLD {
        samples.par_iter().map(scale).collect()
    } else {
        samples.iter().map(scale).collect()
    }
}

/// Smallest and largest finite sample, or `None` if there is none.
fn sample_range<T>(samples: &[T]) -> Option<(f64, f64)>
where
    T: AsPrimitive<f64> + Send + Sync,
{
    let fold = |acc: Option<(f64, f64)>, v: f64| {
        if !v.is_finite() {
            return acc;
        }
        Some(match acc {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        })
    };
    let merge = |a: Option<(f64, f64)>, b: Option<(f64, f64)>| match (a, b) {
        (Some((alo, ahi)), Some((blo, bhi))) => Some((alo.min(blo), ahi.max(bhi))),
        (a, None) => a,
        (None, b) => b,
    };

    if samples.len() >= PARALLEL_SAMPLE_THRESHOLD {
        samples
            .par_iter()
            .fold(|| None, |acc, v| fold(acc, v.as_()))
            .reduce(|| None, merge)
    } else {
        samples.iter().fold(None, |acc, v| fold(acc, v.as_()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_scale_endpoints() {
        let out = min_max_scale(&[100u16, 200, 300]);
        assert_eq!(out, vec![0, 127, 255]);
    }

    #[test]
    fn test_min_max_scale_flat_is_zero() {
        assert_eq!(min_max_scale(&[7.5f32; 6]), vec![0; 6]);
    }

    #[test]
    fn test_min_max_scale_negative_range() {
        let out = min_max_scale(&[-10i16, 0, 10]);
        assert_eq!(out, vec![0, 127, 255]);
    }

    #[test]
    fn test_non_finite_samples_ignored_in_range() {
        let range = sample_range(&[f32::NAN, 1.0, 3.0, f32::INFINITY]);
        assert_eq!(range, Some((1.0, 3.0)));
    }

    #[test]
    fn test_channels_last_transposes_planes() {
        // Two pixels, three planes: R=[1,2], G=[3,4], B=[5,6].
        let planar = Array3::from_shape_vec((3, 1, 2), vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(channels_last(planar.view()), vec![1, 3, 5, 2, 4, 6]);
    }
}
