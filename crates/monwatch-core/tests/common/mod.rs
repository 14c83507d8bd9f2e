#![allow(dead_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tiff::encoder::{colortype, TiffEncoder};

use monwatch_core::cache::{write_png_atomic, CacheIndex};
use monwatch_core::pyramid::PyramidScale;
use monwatch_core::raster::CanonicalImage;

fn encoder(path: &Path) -> TiffEncoder<BufWriter<File>> {
    let file = File::create(path).unwrap();
    TiffEncoder::new(BufWriter::new(file)).unwrap()
}

/// Write a single-page 16-bit grayscale TIFF.
pub fn write_gray16_tiff(path: &Path, width: u32, height: u32, data: &[u16]) {
    assert_eq!(data.len(), (width * height) as usize);
    let mut enc = encoder(path);
    enc.write_image::<colortype::Gray16>(width, height, data)
        .unwrap();
}

/// Write a single-page 8-bit RGB TIFF (`data` interleaved).
pub fn write_rgb8_tiff(path: &Path, width: u32, height: u32, data: &[u8]) {
    assert_eq!(data.len(), (width * height * 3) as usize);
    let mut enc = encoder(path);
    enc.write_image::<colortype::RGB8>(width, height, data).unwrap();
}

/// Write a single-page 32-bit float grayscale TIFF.
pub fn write_gray_f32_tiff(path: &Path, width: u32, height: u32, data: &[f32]) {
    assert_eq!(data.len(), (width * height) as usize);
    let mut enc = encoder(path);
    enc.write_image::<colortype::Gray32Float>(width, height, data)
        .unwrap();
}

/// Write a single-page 16-bit signed grayscale TIFF.
pub fn write_gray_i16_tiff(path: &Path, width: u32, height: u32, data: &[i16]) {
    assert_eq!(data.len(), (width * height) as usize);
    let mut enc = encoder(path);
    enc.write_image::<colortype::GrayI16>(width, height, data)
        .unwrap();
}

/// Write a single-page 16-bit RGB TIFF stored with separate planes
/// (PlanarConfiguration 2), one strip per plane.
pub fn write_separate_planes_tiff(path: &Path, width: u32, height: u32, planes: &[Vec<u16>]) {
    assert_eq!(planes.len(), 3);
    let plane_bytes = width * height * 2;
    // Header, then 10 IFD entries, then the out-of-line arrays, then pixels.
    let entries = 10u32;
    let ifd_end = 8 + 2 + entries * 12 + 4;
    let bits_at = ifd_end;
    let offsets_at = bits_at + 6;
    let counts_at = offsets_at + 12;
    let data_at = counts_at + 12;

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&(entries as u16).to_le_bytes());
    let mut entry = |tag: u16, kind: u16, count: u32, value: u32| {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    };
    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    entry(256, LONG, 1, width);
    entry(257, LONG, 1, height);
    entry(258, SHORT, 3, bits_at);
    entry(259, SHORT, 1, 1);
    entry(262, SHORT, 1, 2);
    entry(273, LONG, 3, offsets_at);
    entry(277, SHORT, 1, 3);
    entry(278, LONG, 1, height);
    entry(279, LONG, 3, counts_at);
    entry(284, SHORT, 1, 2);
    out.extend_from_slice(&0u32.to_le_bytes());

    for _ in 0..3 {
        out.extend_from_slice(&16u16.to_le_bytes());
    }
    for i in 0..3 {
        out.extend_from_slice(&(data_at + i * plane_bytes).to_le_bytes());
    }
    for _ in 0..3 {
        out.extend_from_slice(&plane_bytes.to_le_bytes());
    }
    assert_eq!(out.len() as u32, data_at);
    for plane in planes {
        assert_eq!(plane.len(), (width * height) as usize);
        for value in plane {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    std::fs::write(path, out).unwrap();
}

/// Write one 16-bit grayscale page per channel.
pub fn write_planar_tiff(path: &Path, width: u32, height: u32, planes: &[Vec<u16>]) {
    let mut enc = encoder(path);
    for plane in planes {
        assert_eq!(plane.len(), (width * height) as usize);
        enc.write_image::<colortype::Gray16>(width, height, plane)
            .unwrap();
    }
}

/// A file with a TIFF extension and a truncated header.
pub fn write_corrupt_tiff(path: &Path) {
    std::fs::write(path, b"II*\0\x08\0\0\0garbage").unwrap();
}

/// Horizontal ramp from 0 to `65535`, identical on every row.
pub fn gradient_u16(width: u32, height: u32) -> Vec<u16> {
    let max = (width.max(2) - 1) as f64;
    (0..height)
        .flat_map(|_| (0..width).map(move |x| (x as f64 / max * 65535.0) as u16))
        .collect()
}

/// Write a gradient source TIFF named `name` into `dir` and return its path.
pub fn gradient_source(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    write_gray16_tiff(&path, width, height, &gradient_u16(width, height));
    path
}

/// An RGB image whose pixel (x, y) is `[x, y, 0]` (wrapping).
pub fn coordinate_image(width: u32, height: u32) -> CanonicalImage {
    CanonicalImage::from_rgb(RgbImage::from_fn(width, height, |x, y| {
        Rgb([x as u8, y as u8, 0])
    }))
}

/// Write artifacts for `base` at the given scales, sized from a full-resolution
/// `width` x `height`.
pub fn seed_cache(
    index: &CacheIndex,
    base: &str,
    width: u32,
    height: u32,
    scales: &[PyramidScale],
) {
    std::fs::create_dir_all(index.cache_dir()).unwrap();
    for &scale in scales {
        let (w, h) = scale.dimensions(width, height);
        write_png_atomic(&coordinate_image(w, h), &index.artifact_path(base, scale)).unwrap();
    }
}
