use serde::{Deserialize, Serialize};

/// One rung of the fixed pyramid ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PyramidScale {
    Quarter,
    Half,
    Full,
}

impl PyramidScale {
    /// Build order: full resolution first.
    pub const LADDER: [PyramidScale; 3] = [Self::Full, Self::Half, Self::Quarter];

    /// Quality slider order: lowest resolution first.
    pub const ASCENDING: [PyramidScale; 3] = [Self::Quarter, Self::Half, Self::Full];

    pub fn factor(self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::Half => 0.5,
            Self::Quarter => 0.25,
        }
    }

    /// Scale as rendered in artifact names (`1.0`, `0.5`, `0.25`).
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Full => "1.0",
            Self::Half => "0.5",
            Self::Quarter => "0.25",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::LADDER.into_iter().find(|s| s.suffix() == suffix)
    }

    /// Level dimensions: `floor(w * s) x floor(h * s)`, never below one pixel.
    pub fn dimensions(self, width: u32, height: u32) -> (u32, u32) {
        let f = self.factor();
        let scale = |v: u32| ((v as f64 * f).floor() as u32).max(1);
        (scale(width), scale(height))
    }

    /// Scales strictly below this one, nearest first.
    pub fn lesser(self) -> impl Iterator<Item = PyramidScale> {
        Self::LADDER.into_iter().filter(move |s| *s < self)
    }
}

impl std::fmt::Display for PyramidScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_floor() {
        assert_eq!(PyramidScale::Half.dimensions(101, 55), (50, 27));
        assert_eq!(PyramidScale::Quarter.dimensions(101, 55), (25, 13));
        assert_eq!(PyramidScale::Full.dimensions(101, 55), (101, 55));
    }

    #[test]
    fn test_dimensions_never_zero() {
        assert_eq!(PyramidScale::Quarter.dimensions(3, 2), (1, 1));
    }

    #[test]
    fn test_suffix_roundtrip() {
        for s in PyramidScale::LADDER {
            assert_eq!(PyramidScale::from_suffix(s.suffix()), Some(s));
        }
        assert_eq!(PyramidScale::from_suffix("0.50"), None);
    }

    #[test]
    fn test_lesser_nearest_first() {
        let lesser: Vec<_> = PyramidScale::Full.lesser().collect();
        assert_eq!(lesser, vec![PyramidScale::Half, PyramidScale::Quarter]);
        assert_eq!(PyramidScale::Quarter.lesser().count(), 0);
    }
}
