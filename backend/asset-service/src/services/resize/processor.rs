//! Image resizer - turns an original image into a size-bound JPEG
//!
//! Decodes the scratch copy of the original, skips work when the image already
//! fits the requested bound, otherwise scales the longer side down to the bound
//! and encodes the result as JPEG.
//!
//! Everything here is CPU-bound and blocking; callers run it on
//! `spawn_blocking`.

use super::error::ResolveError;
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Tent filter; its support widens with the scale factor, so every source
/// pixel under a target pixel contributes to it when shrinking.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Default JPEG quality (0-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longer_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// True when neither side exceeds `bound`
    pub fn fits_within(&self, bound: u32) -> bool {
        self.longer_side() <= bound
    }

    /// Scale so the longer side equals `bound`, keeping the aspect ratio.
    ///
    /// The shorter side is rounded to the nearest pixel and never drops below 1.
    pub fn bounded_by(&self, bound: u32) -> Dimensions {
        let scale = |short: u32, long: u32| -> u32 {
            let scaled = (f64::from(short) * f64::from(bound) / f64::from(long)).round();
            (scaled as u32).max(1)
        };

        if self.width >= self.height {
            Dimensions::new(bound, scale(self.height, self.width))
        } else {
            Dimensions::new(scale(self.width, self.height), bound)
        }
    }
}

/// What happened to the original
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Original already fits the bound, nothing was written
    WithinBound(Dimensions),
    /// A derivative with these dimensions was written
    Resized(Dimensions),
}

#[derive(Debug, Clone)]
pub struct ImageResizer {
    jpeg_quality: u8,
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageResizer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Decode `original`, and unless it already fits `bound`, write the
    /// resized JPEG to `derived`.
    pub fn process(
        &self,
        key: &str,
        original: &Path,
        derived: &Path,
        bound: u32,
    ) -> Result<ResizeOutcome, ResolveError> {
        let img = self.decode(key, original)?;
        let (width, height) = img.dimensions();
        let source = Dimensions::new(width, height);

        debug!(key, width, height, bound, "Decoded original image");

        if source.fits_within(bound) {
            return Ok(ResizeOutcome::WithinBound(source));
        }

        let target = source.bounded_by(bound);
        let resized = self.resize(&img, target);
        let encoded = self.encode_jpeg(&resized)?;
        std::fs::write(derived, &encoded)?;

        debug!(
            key,
            width = target.width,
            height = target.height,
            size = encoded.len(),
            "Derivative encoded"
        );

        Ok(ResizeOutcome::Resized(target))
    }

    /// Decode an image file, detecting the format from its content
    pub fn decode(&self, key: &str, path: &Path) -> Result<DynamicImage, ResolveError> {
        let decode_failure = |message: String| ResolveError::DecodeFailure {
            key: key.to_string(),
            message,
        };

        ImageReader::open(path)?
            .with_guessed_format()
            .map_err(|e| decode_failure(e.to_string()))?
            .decode()
            .map_err(|e| decode_failure(e.to_string()))
    }

    pub fn resize(&self, img: &DynamicImage, target: Dimensions) -> DynamicImage {
        img.resize_exact(target.width, target.height, RESAMPLE_FILTER)
    }

    /// Encode as baseline JPEG; alpha is dropped
    pub fn encode_jpeg(&self, img: &DynamicImage) -> Result<Vec<u8>, ResolveError> {
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buf = Vec::new();

        rgb.write_to(
            &mut Cursor::new(&mut buf),
            ImageOutputFormat::Jpeg(self.jpeg_quality),
        )
        .map_err(|e| ResolveError::EncodeFailure(e.to_string()))?;

        Ok(buf)
    }
}
