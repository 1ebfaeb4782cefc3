//! Image codec.
//!
//! This module decodes source and cached blobs, applies the crop or resize
//! transform, and re-encodes the result in the source's own format.
//!
//! # Design Decisions
//!
//! - **Format preserving**: the output format is whatever the source decoded
//!   as. A PNG stays a PNG; a JPEG is re-encoded at the configured quality.
//!
//! - **Passthrough keeps bytes**: when no transform applies, the source is
//!   decoded only to validate it and detect its format. The original bytes are
//!   served unchanged.
//!
//! - **Crop fills then trims**: the image is scaled so the square is fully
//!   covered, then the overflow is cut evenly from both sides. No padding.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::breakpoint::Transform;
use crate::error::OptimizeError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

// =============================================================================
// Types
// =============================================================================

/// A decoded image together with the format it was stored in.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// An encoded image ready to be served.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Encoded bytes
    pub data: Bytes,

    /// Detected format of `data`
    pub format: ImageFormat,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl EncodedImage {
    /// MIME type of the encoded data.
    pub fn content_type(&self) -> &'static str {
        content_type(self.format)
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Decodes, transforms and encodes images.
///
/// # Example
///
/// ```ignore
/// use fly_images::breakpoint::Transform;
/// use fly_images::optimize::ImageCodec;
///
/// let codec = ImageCodec::new();
/// let thumb = codec.apply(source_bytes, Transform::Crop { side: 200 })?;
/// assert_eq!((thumb.width, thumb.height), (200, 200));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    jpeg_quality: u8,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec {
    /// Create a codec with the default JPEG quality.
    pub fn new() -> Self {
        Self::with_quality(DEFAULT_JPEG_QUALITY)
    }

    /// Create a codec that writes JPEG at `quality` (clamped to 1-100).
    pub fn with_quality(quality: u8) -> Self {
        Self {
            jpeg_quality: clamp_quality(quality),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Decode an image, detecting its format from the content.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedImage, OptimizeError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| OptimizeError::DecodeFailure {
                message: e.to_string(),
            })?;

        let format = reader.format().ok_or_else(|| OptimizeError::DecodeFailure {
            message: "unrecognized image format".to_string(),
        })?;

        let image = reader.decode().map_err(|e| OptimizeError::DecodeFailure {
            message: e.to_string(),
        })?;

        Ok(DecodedImage { image, format })
    }

    /// Center-anchored square thumbnail of exactly `side × side`.
    pub fn crop_center(&self, image: &DynamicImage, side: u32) -> DynamicImage {
        image.resize_to_fill(side, side, RESAMPLE_FILTER)
    }

    /// Largest aspect-preserving thumbnail that fits in `width × height`.
    pub fn resize_within(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize(width, height, RESAMPLE_FILTER)
    }

    /// Encode `image` in `format`.
    pub fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Bytes, OptimizeError> {
        let mut output = Vec::new();

        let result = match format {
            ImageFormat::Jpeg => {
                let mut encoder = JpegEncoder::new_with_quality(&mut output, self.jpeg_quality);
                // JPEG has no alpha channel
                encoder.encode_image(&image.to_rgb8())
            }
            other => image.write_to(&mut Cursor::new(&mut output), other),
        };

        result.map_err(|e| OptimizeError::EncodeFailure {
            message: e.to_string(),
        })?;

        Ok(Bytes::from(output))
    }

    /// Decode `data` and describe it without changing it.
    ///
    /// Used for cached blobs, which are served exactly as stored.
    pub fn inspect(&self, data: Bytes) -> Result<EncodedImage, OptimizeError> {
        let decoded = self.decode(&data)?;
        Ok(EncodedImage {
            width: decoded.image.width(),
            height: decoded.image.height(),
            format: decoded.format,
            data,
        })
    }

    /// Apply `transform` to an encoded source image.
    pub fn apply(&self, source: Bytes, transform: Transform) -> Result<EncodedImage, OptimizeError> {
        let decoded = self.decode(&source)?;

        let image = match transform {
            Transform::Crop { side } => self.crop_center(&decoded.image, side),
            Transform::Resize { width, height } => {
                self.resize_within(&decoded.image, width, height)
            }
            Transform::Passthrough => {
                return Ok(EncodedImage {
                    width: decoded.image.width(),
                    height: decoded.image.height(),
                    format: decoded.format,
                    data: source,
                });
            }
        };

        let data = self.encode(&image, decoded.format)?;

        Ok(EncodedImage {
            data,
            format: decoded.format,
            width: image.width(),
            height: image.height(),
        })
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// MIME type for an image format, e.g. `image/jpeg`.
pub fn content_type(format: ImageFormat) -> &'static str {
    format.to_mime_type()
}

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
