/// Minimum sample count to use Rayon parallelism in the min/max scan and rescale.
pub const PARALLEL_SAMPLE_THRESHOLD: usize = 65_536;

/// Maximum value of a canonical 8-bit sample.
pub const U8_MAX_F64: f64 = 255.0;

/// Recognized source raster extensions, compared case-insensitively.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// Extension of persisted pyramid artifacts (lossless PNG).
pub const ARTIFACT_EXTENSION: &str = "png";

/// Artifact name written by older builds for the full-resolution level.
pub const LEGACY_FULL_SUFFIX: &str = "_0";

/// Page count above which a multi-page TIFF is never treated as planar channels.
pub const MAX_PLANAR_PAGES: usize = 4;

/// Default lower zoom bound.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// Default upper zoom bound while viewing cached levels.
pub const DEFAULT_MAX_ZOOM: f64 = 20.0;

/// Zoom factor above which the view offers to switch to the original source.
pub const DEFAULT_PROMOTION_THRESHOLD: f64 = 5.5;

/// Upper zoom bound once the original source backs the view.
pub const DEFAULT_ORIGINAL_MAX_ZOOM: f64 = 1000.0;

/// Distance below the promotion threshold the zoom is clamped to after a declined promotion.
pub const DEFAULT_DECLINE_MARGIN: f64 = 0.1;

/// Multiplicative zoom step per wheel notch.
pub const DEFAULT_WHEEL_STEP: f64 = 1.25;

/// Divisor mapping a quality slider percent onto a ladder index.
pub const QUALITY_SLIDER_DIVISOR: f64 = 33.34;

/// Initial quality slider position (full resolution).
pub const DEFAULT_QUALITY_PERCENT: u8 = 100;

/// Linear detail headroom targeted when loading the original: the source is
/// downscaled to roughly this many times the viewport resolution. Empirical.
pub const DEFAULT_DETAIL_HEADROOM: f64 = 10.0;

/// Bounded wait (ms) for a cancelled cache job to terminate before a new one starts.
pub const DEFAULT_CANCEL_WAIT_MS: u64 = 2_000;

/// Default directory scanned for source rasters.
pub const DEFAULT_INPUT_DIR: &str = "test";

/// Default directory holding pyramid artifacts.
pub const DEFAULT_CACHE_DIR: &str = "cache/images";
