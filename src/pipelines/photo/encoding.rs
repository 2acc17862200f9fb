// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! This module handles encoding capture images:
//! - Color photograph to JPEG (with quality control)
//! - Normalized depth map to 8-bit grayscale PNG (lossless), optionally
//!   carrying the capture metadata in a text chunk
//!
//! Encoding is CPU-bound; callers run it on a blocking task.

use super::processing::ColorImage;
use crate::constants::PNG_METADATA_KEYWORD;
use crate::depth::NormalizedDepthImage;
use crate::errors::ArtifactError;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    High,
    /// Maximum quality (minimal compression)
    #[default]
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 100,
        }
    }
}

/// Photo encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with maximum JPEG quality
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(quality: EncodingQuality) -> Self {
        Self { quality }
    }

    /// Produce JPEG bytes for the color photograph
    ///
    /// JPEG input is kept byte-for-byte. Other encoded formats are decoded
    /// and re-encoded; raw buffers are converted to RGB first.
    pub fn encode_color(&self, color: &ColorImage) -> Result<Vec<u8>, ArtifactError> {
        match color {
            ColorImage::Encoded(bytes) => {
                if let Ok(ImageFormat::Jpeg) = image::guess_format(bytes) {
                    debug!(size = bytes.len(), "Color image already JPEG");
                    return Ok(bytes.clone());
                }
                let decoded = image::load_from_memory(bytes)?;
                Self::encode_jpeg(&decoded.to_rgb8(), self.quality)
            }
            ColorImage::Raw(raw) => Self::encode_jpeg(&raw.to_rgb_image()?, self.quality),
        }
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> Result<Vec<u8>, ArtifactError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| ArtifactError::Encode(format!("JPEG encoding failed: {}", e)))?;

        debug!(size = buffer.len(), "JPEG encoding complete");
        Ok(buffer)
    }

    /// Encode a normalized depth map as 8-bit grayscale PNG
    ///
    /// When `description` is given it is stored in an iTXt chunk under the
    /// `Description` keyword, so the image carries its own metadata.
    pub fn encode_depth_png(
        image: &NormalizedDepthImage,
        description: Option<&str>,
    ) -> Result<Vec<u8>, ArtifactError> {
        let expected = image.width as usize * image.height as usize;
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
            return Err(ArtifactError::Encode(format!(
                "depth image {}x{} holds {} pixels",
                image.width,
                image.height,
                image.pixels.len()
            )));
        }

        let png_err = |e: png::EncodingError| ArtifactError::Encode(format!("PNG encoding failed: {}", e));

        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, image.width, image.height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            if let Some(text) = description {
                encoder
                    .add_itxt_chunk(PNG_METADATA_KEYWORD.to_string(), text.to_string())
                    .map_err(png_err)?;
            }
            let mut writer = encoder.write_header().map_err(png_err)?;
            writer.write_image_data(&image.pixels).map_err(png_err)?;
            writer.finish().map_err(png_err)?;
        }

        debug!(
            size = buffer.len(),
            embedded = description.is_some(),
            "PNG encoding complete"
        );
        Ok(buffer)
    }
}

/// Read a text chunk from PNG bytes
///
/// Looks at iTXt chunks first, then tEXt and zTXt. Returns `Ok(None)` when
/// the image has no chunk with that keyword.
pub fn read_png_text(bytes: &[u8], keyword: &str) -> Result<Option<String>, ArtifactError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_ignore_text_chunk(false);
    let reader = decoder
        .read_info()
        .map_err(|e| ArtifactError::Encode(format!("PNG decoding failed: {}", e)))?;
    let info = reader.info();

    if let Some(chunk) = info.utf8_text.iter().find(|c| c.keyword == keyword) {
        return chunk
            .get_text()
            .map(Some)
            .map_err(|e| ArtifactError::Encode(format!("bad iTXt chunk: {}", e)));
    }
    if let Some(chunk) = info
        .uncompressed_latin1_text
        .iter()
        .find(|c| c.keyword == keyword)
    {
        return Ok(Some(chunk.text.clone()));
    }
    if let Some(chunk) = info
        .compressed_latin1_text
        .iter()
        .find(|c| c.keyword == keyword)
    {
        return chunk
            .get_text()
            .map(Some)
            .map_err(|e| ArtifactError::Encode(format!("bad zTXt chunk: {}", e)));
    }
    Ok(None)
}

/// Decode a grayscale PNG back into a normalized depth image
pub fn decode_depth_png(bytes: &[u8]) -> Result<NormalizedDepthImage, ArtifactError> {
    let gray = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_luma8();
    let (width, height) = gray.dimensions();
    NormalizedDepthImage::from_raw(width, height, gray.into_raw())
        .ok_or_else(|| ArtifactError::Encode("decoded depth size mismatch".to_string()))
}
