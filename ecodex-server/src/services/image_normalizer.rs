//! Image normalization
//!
//! Uploaded photos are re-encoded to a bounded-size JPEG before being sent
//! to the oracle and stored. Resizing fits within 800x600 preserving aspect
//! ratio and never upscales.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;

const MAX_WIDTH: u32 = 800;
const MAX_HEIGHT: u32 = 600;
const JPEG_QUALITY: u8 = 85;

/// Image normalization errors
#[derive(Debug, Error)]
pub enum ImageError {
    /// Bytes are not a valid or supported image. Fatal for the pipeline
    /// run; malformed input is not transient.
    #[error("Unsupported or corrupt image: {0}")]
    Decode(String),

    #[error("Image re-encode failed: {0}")]
    Encode(String),
}

/// Result of normalizing an upload
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Re-encoded JPEG, base64
    pub image_base64: String,
    /// The untouched upload, base64
    pub original_base64: String,
    /// Dimensions after normalization
    pub width: u32,
    pub height: u32,
}

/// Decodes uploads and produces bounded-size JPEG re-encodings
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageNormalizer {
    pub fn new() -> Self {
        Self {
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            quality: JPEG_QUALITY,
        }
    }

    /// Decode, resize to fit within the bounds (no upscaling) and
    /// re-encode as JPEG. Returns both versions as base64.
    pub fn normalize(&self, bytes: &[u8]) -> Result<NormalizedImage, ImageError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let resized = if width > self.max_width || height > self.max_height {
            decoded.resize(self.max_width, self.max_height, FilterType::Lanczos3)
        } else {
            decoded
        };

        // JPEG has no alpha channel
        let rgb = resized.to_rgb8();

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, self.quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| ImageError::Encode(e.to_string()))?;

        Ok(NormalizedImage {
            image_base64: BASE64.encode(&jpeg),
            original_base64: BASE64.encode(bytes),
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}
