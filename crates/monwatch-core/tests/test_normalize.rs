mod common;

use monwatch_core::error::MonwatchError;
use monwatch_core::raster::{
    normalize, normalize_raw, probe, read_raw, RawRaster, SampleBuffer, SampleType,
};

#[test]
fn test_flat_u16_normalizes_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.tif");
    common::write_gray16_tiff(&path, 8, 4, &[4242; 32]);

    let image = normalize(&path).unwrap();
    assert_eq!((image.width(), image.height()), (8, 4));
    assert_eq!(image.channels(), 3);
    assert!(image.as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn test_u8_rgb_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.tif");
    let data: Vec<u8> = (0..2 * 2 * 3).map(|v| v as u8 * 10).collect();
    common::write_rgb8_tiff(&path, 2, 2, &data);

    let image = normalize(&path).unwrap();
    assert_eq!(image.as_bytes(), data.as_slice());
}

#[test]
fn test_gray16_gradient_spans_full_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::gradient_source(dir.path(), "ramp.tif", 16, 2);

    let image = normalize(&path).unwrap();
    let bytes = image.as_bytes();
    // Gray is replicated into all three channels.
    for px in bytes.chunks_exact(3) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
    assert_eq!(bytes[0], 0);
    assert_eq!(bytes[15 * 3], 255);
}

#[test]
fn test_float_source_is_rescaled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("float.tif");
    common::write_gray_f32_tiff(&path, 4, 1, &[-1.0, 0.0, 1.0, 3.0]);

    let image = normalize(&path).unwrap();
    let firsts: Vec<u8> = image.as_bytes().chunks_exact(3).map(|px| px[0]).collect();
    // (v + 1) / 4 * 255, floored
    assert_eq!(firsts, vec![0, 63, 127, 255]);
}

#[test]
fn test_planar_pages_are_transposed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planar.tif");
    let planes = vec![vec![0, 256], vec![512, 768], vec![1024, 0]];
    common::write_planar_tiff(&path, 2, 1, &planes);

    let raw = read_raw(&path).unwrap();
    assert!(raw.channels_first);
    assert_eq!(raw.shape(), [3, 1, 2]);

    let image = normalize(&path).unwrap();
    assert_eq!(image.as_bytes(), &[0, 127, 255, 63, 191, 0]);
}

#[test]
fn test_separate_planes_are_transposed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planes.tif");
    let planes = vec![vec![0, 1000], vec![2000, 3000], vec![4000, 0]];
    common::write_separate_planes_tiff(&path, 2, 1, &planes);

    let raw = read_raw(&path).unwrap();
    assert!(raw.channels_first);
    assert_eq!(raw.channels, 3);
    assert_eq!(raw.shape(), [3, 1, 2]);

    let image = normalize(&path).unwrap();
    assert_eq!(image.as_bytes(), &[0, 127, 255, 63, 191, 0]);
}

#[test]
fn test_two_page_gray_uses_first_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.tif");
    common::write_planar_tiff(&path, 2, 1, &[vec![0, 100], vec![7, 7]]);

    let raw = read_raw(&path).unwrap();
    assert!(!raw.channels_first);
    assert_eq!(raw.channels, 1);
    let image = normalize(&path).unwrap();
    assert_eq!(image.as_bytes(), &[0, 0, 0, 255, 255, 255]);
}

#[test]
fn test_probe_reads_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planar.tif");
    let planes = vec![vec![1u16; 6], vec![2; 6], vec![3; 6], vec![4; 6]];
    common::write_planar_tiff(&path, 3, 2, &planes);

    let source = probe(&path).unwrap();
    assert_eq!((source.width, source.height), (3, 2));
    assert_eq!(source.channels, 1);
    assert_eq!(source.bits_per_sample, 16);
    assert_eq!(source.sample_type, SampleType::U16);
    assert!(!source.planar);
    assert_eq!(source.pages, 4);
    assert_eq!(source.base_name(), "planar");

    let signed = dir.path().join("signed.tif");
    common::write_gray_i16_tiff(&signed, 2, 1, &[-5, 5]);
    let source = probe(&signed).unwrap();
    assert_eq!(source.bits_per_sample, 16);
    assert_eq!(source.sample_type, SampleType::I16);

    let float = dir.path().join("float.tif");
    common::write_gray_f32_tiff(&float, 2, 1, &[0.5, 1.5]);
    assert_eq!(probe(&float).unwrap().sample_type, SampleType::F32);

    let planes = dir.path().join("planes.tif");
    common::write_separate_planes_tiff(&planes, 2, 1, &[vec![1, 2], vec![3, 4], vec![5, 6]]);
    let source = probe(&planes).unwrap();
    assert_eq!((source.channels, source.pages), (3, 1));
    assert!(source.planar);
}

#[test]
fn test_corrupt_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.tif");
    common::write_corrupt_tiff(&path);

    let err = normalize(&path).unwrap_err();
    assert!(matches!(err, MonwatchError::UnreadableSource { .. }), "{err}");
}

#[test]
fn test_missing_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let err = normalize(&dir.path().join("nope.tif")).unwrap_err();
    assert!(matches!(err, MonwatchError::UnreadableSource { .. }));
}

#[test]
fn test_two_channel_raster_is_unsupported() {
    let raw = RawRaster {
        width: 2,
        height: 1,
        channels: 2,
        channels_first: false,
        samples: SampleBuffer::U8(vec![1, 2, 3, 4]),
    };
    let err = normalize_raw(raw).unwrap_err();
    assert!(matches!(err, MonwatchError::UnsupportedLayout(_)));
}

#[test]
fn test_five_planes_are_unsupported() {
    let raw = RawRaster {
        width: 1,
        height: 1,
        channels: 5,
        channels_first: true,
        samples: SampleBuffer::U16(vec![1, 2, 3, 4, 5]),
    };
    assert!(matches!(
        normalize_raw(raw),
        Err(MonwatchError::UnsupportedLayout(_))
    ));
}

#[test]
fn test_rgba_keeps_alpha() {
    let raw = RawRaster {
        width: 1,
        height: 2,
        channels: 4,
        channels_first: false,
        samples: SampleBuffer::U8(vec![1, 2, 3, 4, 5, 6, 7, 8]),
    };
    let image = normalize_raw(raw).unwrap();
    assert!(image.has_alpha());
    assert_eq!(image.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
}
