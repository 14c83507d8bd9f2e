use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::{SampleFormat, Tag};
use tiff::ColorType;
use tracing::debug;

use crate::consts::MAX_PLANAR_PAGES;
use crate::error::{MonwatchError, Result};

/// Numeric type of the stored samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    /// Half floats are widened to `F32` when decoded.
    F16,
    F32,
    F64,
}

impl SampleType {
    /// Resolve a TIFF SampleFormat code and bit depth.
    fn from_tiff(format: u16, bits: u8) -> Result<Self> {
        let sample_type = match (SampleFormat::from_u16(format), bits) {
            (Some(SampleFormat::Uint), 8) => Self::U8,
            (Some(SampleFormat::Uint), 16) => Self::U16,
            (Some(SampleFormat::Uint), 32) => Self::U32,
            (Some(SampleFormat::Uint), 64) => Self::U64,
            (Some(SampleFormat::Int), 8) => Self::I8,
            (Some(SampleFormat::Int), 16) => Self::I16,
            (Some(SampleFormat::Int), 32) => Self::I32,
            (Some(SampleFormat::Int), 64) => Self::I64,
            (Some(SampleFormat::IEEEFP), 16) => Self::F16,
            (Some(SampleFormat::IEEEFP), 32) => Self::F32,
            (Some(SampleFormat::IEEEFP), 64) => Self::F64,
            _ => {
                return Err(MonwatchError::UnsupportedLayout(format!(
                    "{bits}-bit samples with TIFF sample format {format}"
                )))
            }
        };
        Ok(sample_type)
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F16 => "float16",
            Self::F32 => "float32",
            Self::F64 => "float64",
        };
        write!(f, "{name}")
    }
}

/// Raw decoded samples, kept in their stored type.
#[derive(Clone, Debug)]
pub enum SampleBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl SampleBuffer {
    pub fn sample_type(&self) -> SampleType {
        match self {
            Self::U8(_) => SampleType::U8,
            Self::U16(_) => SampleType::U16,
            Self::U32(_) => SampleType::U32,
            Self::U64(_) => SampleType::U64,
            Self::I8(_) => SampleType::I8,
            Self::I16(_) => SampleType::I16,
            Self::I32(_) => SampleType::I32,
            Self::I64(_) => SampleType::I64,
            Self::F32(_) => SampleType::F32,
            Self::F64(_) => SampleType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append another page of the same sample type. Returns `false` on a type mismatch.
    fn append(&mut self, other: SampleBuffer) -> bool {
        match (self, other) {
            (Self::U8(a), Self::U8(b)) => a.extend(b),
            (Self::U16(a), Self::U16(b)) => a.extend(b),
            (Self::U32(a), Self::U32(b)) => a.extend(b),
            (Self::U64(a), Self::U64(b)) => a.extend(b),
            (Self::I8(a), Self::I8(b)) => a.extend(b),
            (Self::I16(a), Self::I16(b)) => a.extend(b),
            (Self::I32(a), Self::I32(b)) => a.extend(b),
            (Self::I64(a), Self::I64(b)) => a.extend(b),
            (Self::F32(a), Self::F32(b)) => a.extend(b),
            (Self::F64(a), Self::F64(b)) => a.extend(b),
            _ => return false,
        }
        true
    }
}

impl From<DecodingResult> for SampleBuffer {
    fn from(result: DecodingResult) -> Self {
        match result {
            DecodingResult::U8(v) => Self::U8(v),
            DecodingResult::U16(v) => Self::U16(v),
            DecodingResult::U32(v) => Self::U32(v),
            DecodingResult::U64(v) => Self::U64(v),
            DecodingResult::I8(v) => Self::I8(v),
            DecodingResult::I16(v) => Self::I16(v),
            DecodingResult::I32(v) => Self::I32(v),
            DecodingResult::I64(v) => Self::I64(v),
            DecodingResult::F16(v) => Self::F32(v.into_iter().map(f32::from).collect()),
            DecodingResult::F32(v) => Self::F32(v),
            DecodingResult::F64(v) => Self::F64(v),
        }
    }
}

/// A decoded source raster before normalization.
///
/// Interleaved rasters are laid out as (height, width, channels); planar ones
/// (PlanarConfiguration 2, or one single-channel page per channel) as
/// (channels, height, width).
#[derive(Clone, Debug)]
pub struct RawRaster {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    /// `true` when the channel axis leads.
    pub channels_first: bool,
    pub samples: SampleBuffer,
}

impl RawRaster {
    pub fn sample_type(&self) -> SampleType {
        self.samples.sample_type()
    }

    /// Shape as stored: (h, w, c) or (c, h, w).
    pub fn shape(&self) -> [usize; 3] {
        let (h, w) = (self.height as usize, self.width as usize);
        if self.channels_first {
            [self.channels, h, w]
        } else {
            [h, w, self.channels]
        }
    }
}

/// Header-level description of a source raster.
#[derive(Clone, Debug)]
pub struct SourceRaster {
    pub path: PathBuf,
    /// Source identity together with `path`.
    pub modified: SystemTime,
    pub width: u32,
    pub height: u32,
    /// Samples per pixel of the first page.
    pub channels: usize,
    pub bits_per_sample: u8,
    pub sample_type: SampleType,
    /// Channels stored as separate planes rather than interleaved.
    pub planar: bool,
    pub pages: usize,
}

impl SourceRaster {
    /// File stem used to name the cached artifacts.
    pub fn base_name(&self) -> String {
        base_name(&self.path)
    }

    /// Decoded size of the canonical 8-bit image in bytes.
    pub fn canonical_bytes(&self) -> u64 {
        let channels = if self.channels == 4 { 4 } else { 3 };
        self.width as u64 * self.height as u64 * channels
    }
}

/// File stem of a source path, the identity used to name its artifacts.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path).map_err(|e| MonwatchError::unreadable(path, e))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| MonwatchError::unreadable(path, e))?;
    // Satellite composites routinely exceed the default decoding buffer limit.
    Ok(decoder.with_limits(Limits::unlimited()))
}

fn color_layout(color: ColorType) -> Result<(usize, u8)> {
    match color {
        ColorType::Gray(bits) => Ok((1, bits)),
        ColorType::GrayA(bits) => Ok((2, bits)),
        ColorType::RGB(bits) | ColorType::YCbCr(bits) => Ok((3, bits)),
        ColorType::RGBA(bits) | ColorType::CMYK(bits) => Ok((4, bits)),
        other => Err(MonwatchError::UnsupportedLayout(format!(
            "TIFF color type {other:?}"
        ))),
    }
}

/// Read the TIFF header of `path` without decoding any pixel data.
pub fn probe(path: &Path) -> Result<SourceRaster> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| MonwatchError::unreadable(path, e))?;
    let mut decoder = open_decoder(path)?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| MonwatchError::unreadable(path, e))?;
    let color = decoder
        .colortype()
        .map_err(|e| MonwatchError::unreadable(path, e))?;
    let (channels, bits_per_sample) = color_layout(color)?;
    // Both tags default to unsigned integer, chunky layout when absent.
    let format = decoder
        .find_tag_unsigned_vec::<u16>(Tag::SampleFormat)
        .map_err(|e| MonwatchError::unreadable(path, e))?
        .and_then(|formats| formats.first().copied())
        .unwrap_or(1);
    let sample_type = SampleType::from_tiff(format, bits_per_sample)?;
    let planar = decoder
        .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)
        .map_err(|e| MonwatchError::unreadable(path, e))?
        == Some(2);

    let mut pages = 1;
    while decoder.more_images() {
        decoder
            .next_image()
            .map_err(|e| MonwatchError::unreadable(path, e))?;
        pages += 1;
    }

    Ok(SourceRaster {
        path: path.to_path_buf(),
        modified,
        width,
        height,
        channels,
        bits_per_sample,
        sample_type,
        planar,
        pages,
    })
}

/// Decode the raw sample buffer and shape of a TIFF.
///
/// A page stored with separate planes is read channels-first. A file holding
/// 3 or 4 single-channel pages of identical size and sample type is read as a
/// channels-first stack; otherwise only the first page is used.
pub fn read_raw(path: &Path) -> Result<RawRaster> {
    let mut decoder = open_decoder(path)?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| MonwatchError::unreadable(path, e))?;
    let color = decoder
        .colortype()
        .map_err(|e| MonwatchError::unreadable(path, e))?;
    let (channels, _) = color_layout(color)?;
    let (samples, planes) = read_page(&mut decoder, path)?;

    let expected = width as usize * height as usize * channels;
    if samples.len() != expected {
        return Err(MonwatchError::unreadable(
            path,
            format!("expected {expected} samples, decoded {}", samples.len()),
        ));
    }

    if planes > 1 {
        debug!(file = %path.display(), planes, "Reading separate-plane TIFF");
        return Ok(RawRaster {
            width,
            height,
            channels,
            channels_first: true,
            samples,
        });
    }

    if channels == 1 && decoder.more_images() {
        if let Some(stacked) = read_planar_pages(&mut decoder, path, width, height, &samples)? {
            debug!(
                file = %path.display(),
                pages = stacked.len() / expected,
                "Reading multi-page TIFF as planar channels"
            );
            return Ok(RawRaster {
                width,
                height,
                channels: stacked.len() / expected,
                channels_first: true,
                samples: stacked,
            });
        }
    }

    Ok(RawRaster {
        width,
        height,
        channels,
        channels_first: false,
        samples,
    })
}

/// Decode every plane of the current page, returning the samples and plane count.
///
/// Separate planes land one after another, so a planar page comes out as
/// (channels, height, width).
fn read_page(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
) -> Result<(SampleBuffer, usize)> {
    let mut result = DecodingResult::U8(Vec::new());
    let layout = decoder
        .read_image_to_buffer(&mut result)
        .map_err(|e| MonwatchError::unreadable(path, e))?;
    Ok((result.into(), layout.planes))
}

/// Try to extend the first page with the following ones as extra channels.
fn read_planar_pages(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
    width: u32,
    height: u32,
    first: &SampleBuffer,
) -> Result<Option<SampleBuffer>> {
    let mut stacked = first.clone();
    let mut pages = 1;

    while decoder.more_images() {
        pages += 1;
        if pages > MAX_PLANAR_PAGES {
            return Ok(None);
        }
        decoder
            .next_image()
            .map_err(|e| MonwatchError::unreadable(path, e))?;
        let dims = decoder
            .dimensions()
            .map_err(|e| MonwatchError::unreadable(path, e))?;
        let color = decoder
            .colortype()
            .map_err(|e| MonwatchError::unreadable(path, e))?;
        if dims != (width, height) || !matches!(color, ColorType::Gray(_)) {
            return Ok(None);
        }
        let (page, _) = read_page(decoder, path)?;
        if !stacked.append(page) {
            return Ok(None);
        }
    }

    if pages == 3 || pages == 4 {
        Ok(Some(stacked))
    } else {
        Ok(None)
    }
}
