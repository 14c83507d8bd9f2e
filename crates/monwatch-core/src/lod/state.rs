use crate::config::ViewportConfig;
use crate::consts::DEFAULT_QUALITY_PERCENT;
use crate::geometry::ViewPoint;
use crate::pyramid::PyramidScale;

/// What currently backs the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackingScale {
    Level(PyramidScale),
    /// The original source, loaded at `effective` times its native resolution.
    Original { effective: f64 },
}

impl BackingScale {
    /// Resolution relative to the full-resolution source.
    pub fn factor(self) -> f64 {
        match self {
            Self::Level(scale) => scale.factor(),
            Self::Original { effective } => effective,
        }
    }

    pub fn is_original(self) -> bool {
        matches!(self, Self::Original { .. })
    }
}

impl std::fmt::Display for BackingScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Level(scale) => write!(f, "x{scale}"),
            Self::Original { effective } => write!(f, "original (x{effective:.3})"),
        }
    }
}

/// Zoom and backing state of one image session.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportState {
    /// Always positive.
    pub zoom: f64,
    /// `None` until the first buffer of the session is shown.
    pub backing: Option<BackingScale>,
    pub using_original: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub promotion_threshold: f64,
    /// View center in the coordinates of the current backing buffer.
    pub center: ViewPoint,
    /// Last applied quality slider position.
    pub quality_percent: u8,
}

impl ViewportState {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            zoom: 1.0,
            backing: None,
            using_original: false,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            promotion_threshold: config.promotion_threshold,
            center: ViewPoint::default(),
            quality_percent: DEFAULT_QUALITY_PERCENT,
        }
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
