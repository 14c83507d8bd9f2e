use image::imageops::FilterType;
use image::{DynamicImage, RgbImage, RgbaImage};

/// An 8-bit-per-channel RGB or RGBA image, the common currency between the
/// normalizer, the pyramid builder and the viewport.
#[derive(Clone, Debug)]
pub struct CanonicalImage {
    image: DynamicImage,
}

impl CanonicalImage {
    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(image),
        }
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    /// Wrap any decoded image, converting to 8-bit RGB or RGBA.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Self { image },
            other if other.color().has_alpha() => Self::from_rgba(other.to_rgba8()),
            other => Self::from_rgb(other.to_rgb8()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channels(&self) -> usize {
        if self.has_alpha() {
            4
        } else {
            3
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self.image, DynamicImage::ImageRgba8(_))
    }

    /// Interleaved pixel bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Resize to exactly `width` x `height` with the Lanczos filter.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        Self {
            image: resize_lanczos(&self.image, width, height),
        }
    }
}

/// High-quality downsampling shared by the pyramid builder and the original loader.
pub fn resize_lanczos(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize_exact(width, height, FilterType::Lanczos3)
}
