mod common;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use monwatch_core::cache::{artifact_dimensions, load_artifact, CacheIndex};
use monwatch_core::error::MonwatchError;
use monwatch_core::pyramid::{
    build_pyramid_cache, list_sources, BuildReporter, PyramidCacheBuilder, PyramidLevel,
    PyramidScale,
};

#[test]
fn test_batch_with_one_corrupt_file() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    for name in ["a.tif", "b.tiff", "c.TIF"] {
        common::gradient_source(input.path(), name, 20, 10);
    }
    common::write_corrupt_tiff(&input.path().join("broken.tif"));

    let report = build_pyramid_cache(input.path(), cache.path()).unwrap();

    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert!(report.is_partial_failure());
    assert!(!report.cancelled);
    assert_eq!(report.failures[0].path.file_name().unwrap(), "broken.tif");
    assert_eq!(report.levels.len(), 9);

    assert!(report.log.iter().any(|l| l == "[INFO] Processing a.tif"));
    assert!(report.log.iter().any(|l| l.starts_with("[ERROR] broken.tif: ")));
    let saved = report
        .log
        .iter()
        .filter(|l| l.starts_with("[INFO] Saved cached image: "))
        .count();
    assert_eq!(saved, 9);
}

#[test]
fn test_level_dimensions_are_floored() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    common::gradient_source(input.path(), "odd.tif", 101, 55);

    let report = build_pyramid_cache(input.path(), cache.path()).unwrap();

    let dims: Vec<_> = report
        .levels
        .iter()
        .map(|l| (l.scale, l.width, l.height))
        .collect();
    assert_eq!(
        dims,
        vec![
            (PyramidScale::Full, 101, 55),
            (PyramidScale::Half, 50, 27),
            (PyramidScale::Quarter, 25, 13),
        ]
    );
    for level in &report.levels {
        assert_eq!(
            artifact_dimensions(&level.path).unwrap(),
            (level.width, level.height)
        );
    }
    assert_eq!(
        report.levels[0].path.file_name().unwrap(),
        "odd_x1.0.png"
    );
}

#[test]
fn test_tiny_source_levels_clamp_to_one_pixel() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    common::gradient_source(input.path(), "tiny.tif", 3, 1);

    let report = build_pyramid_cache(input.path(), cache.path()).unwrap();
    let quarter = report
        .levels
        .iter()
        .find(|l| l.scale == PyramidScale::Quarter)
        .unwrap();
    assert_eq!(artifact_dimensions(&quarter.path).unwrap(), (1, 1));
}

#[test]
fn test_rebuild_keeps_dimensions_and_leaves_no_temp_files() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    common::gradient_source(input.path(), "twice.tif", 40, 30);

    let first = build_pyramid_cache(input.path(), cache.path()).unwrap();
    let second = build_pyramid_cache(input.path(), cache.path()).unwrap();

    for (a, b) in first.levels.iter().zip(&second.levels) {
        assert_eq!(a.path, b.path);
        assert_eq!(
            artifact_dimensions(&a.path).unwrap(),
            artifact_dimensions(&b.path).unwrap()
        );
        assert!(std::fs::metadata(&b.path).unwrap().len() > 0);
    }

    let mut names: Vec<_> = std::fs::read_dir(cache.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["twice_x0.25.png", "twice_x0.5.png", "twice_x1.0.png"]
    );
}

#[test]
fn test_readers_never_see_partial_artifacts_during_rebuild() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    common::gradient_source(input.path(), "busy.tif", 640, 480);
    build_pyramid_cache(input.path(), cache.path()).unwrap();

    let index = CacheIndex::new(cache.path());
    let done = AtomicBool::new(false);
    let reads = AtomicUsize::new(0);

    thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..8 {
                build_pyramid_cache(input.path(), cache.path()).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        scope.spawn(|| {
            loop {
                let finished = done.load(Ordering::SeqCst);
                for scale in PyramidScale::LADDER {
                    let entry = index.lookup("busy", scale).unwrap();
                    let expected = scale.dimensions(640, 480);
                    assert!(std::fs::metadata(&entry.path).unwrap().len() > 0);
                    assert_eq!(artifact_dimensions(&entry.path).unwrap(), expected);
                    let image = load_artifact(&entry.path).unwrap();
                    assert_eq!((image.width(), image.height()), expected);
                    reads.fetch_add(1, Ordering::SeqCst);
                }
                if finished {
                    break;
                }
            }
        });
    });

    assert!(reads.load(Ordering::SeqCst) > 0);
}

#[test]
fn test_empty_directory_is_no_source_found() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("notes.txt"), "not a raster").unwrap();

    let err = build_pyramid_cache(input.path(), cache.path()).unwrap_err();
    assert!(matches!(err, MonwatchError::NoSourceFound(_)));
}

#[test]
fn test_missing_input_directory() {
    let root = tempfile::tempdir().unwrap();
    let err = PyramidCacheBuilder::new(root.path().join("absent"), root.path().join("cache"))
        .err()
        .unwrap();
    assert!(matches!(err, MonwatchError::DirectoryMissing(_)));
}

#[test]
fn test_builder_creates_cache_directory() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let cache_dir = root.path().join("cache").join("images");
    common::gradient_source(input.path(), "a.tif", 8, 8);

    let builder = PyramidCacheBuilder::new(input.path(), &cache_dir).unwrap();
    assert!(cache_dir.is_dir());
    let report = builder.build().unwrap();
    assert_eq!(report.succeeded.len(), 1);
}

#[test]
fn test_all_files_failing_is_an_error() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    common::write_corrupt_tiff(&input.path().join("x.tif"));
    common::write_corrupt_tiff(&input.path().join("y.tif"));

    match build_pyramid_cache(input.path(), cache.path()) {
        Err(MonwatchError::PartialFailure { failures }) => assert_eq!(failures.len(), 2),
        other => panic!("expected PartialFailure, got {other:?}"),
    }
}

#[test]
fn test_list_sources_sorted_and_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.TIF", "a.tiff", "c.txt", "d.png"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    std::fs::create_dir(dir.path().join("e.tif")).unwrap();

    let sources = list_sources(dir.path()).unwrap();
    let names: Vec<_> = sources
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.tiff", "b.TIF"]);
}

/// Requests cancellation once `limit` artifacts have been written.
struct CancelAfter {
    limit: usize,
    written: AtomicUsize,
}

impl BuildReporter for CancelAfter {
    fn level_written(&self, _level: &PyramidLevel) {
        self.written.fetch_add(1, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.written.load(Ordering::SeqCst) >= self.limit
    }
}

#[test]
fn test_cancellation_is_checked_between_files() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    for name in ["1.tif", "2.tif", "3.tif"] {
        common::gradient_source(input.path(), name, 16, 16);
    }

    let reporter = CancelAfter {
        limit: 1,
        written: AtomicUsize::new(0),
    };
    let builder = PyramidCacheBuilder::new(input.path(), cache.path()).unwrap();
    let report = builder.build_reported(&reporter).unwrap();

    // The first file is finished even though cancellation was requested mid-file.
    assert!(report.cancelled);
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.levels.len(), 3);
    for level in &report.levels {
        load_artifact(&level.path).unwrap();
    }
    assert!(!cache.path().join("2_x1.0.png").exists());
}

#[test]
fn test_cancelled_before_start_is_not_an_error() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    common::gradient_source(input.path(), "a.tif", 8, 8);

    let reporter = CancelAfter {
        limit: 0,
        written: AtomicUsize::new(0),
    };
    let builder = PyramidCacheBuilder::new(input.path(), cache.path()).unwrap();
    let report = builder.build_reported(&reporter).unwrap();
    assert!(report.cancelled);
    assert!(report.levels.is_empty());
}

#[test]
fn test_levels_for_source() {
    let input = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let a = common::gradient_source(input.path(), "a.tif", 8, 8);
    common::gradient_source(input.path(), "b.tif", 8, 8);

    let report = build_pyramid_cache(input.path(), cache.path()).unwrap();
    let levels: Vec<_> = report.levels_for(Path::new(&a)).collect();
    assert_eq!(levels.len(), 3);
    assert!(levels.iter().all(|l| l.base_name == "a"));
}
