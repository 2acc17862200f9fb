// SPDX-License-Identifier: GPL-3.0-only

//! Color frame preparation
//!
//! The capture backend hands over the color photograph either as encoded
//! bytes (the camera already compressed it) or as a raw pixel buffer with an
//! explicit row stride. This module turns a raw buffer into a packed
//! [`RgbImage`] ready for encoding:
//! - BGRA to RGB (swap and drop alpha)
//! - RGBA to RGB (drop alpha)
//! - Row padding removed

use crate::errors::ArtifactError;
use image::RgbImage;
use tracing::debug;

/// Pixel layout of a raw color buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 bytes per pixel, R G B
    Rgb8,
    /// 4 bytes per pixel, R G B A
    Rgba8,
    /// 4 bytes per pixel, B G R A (common camera framework layout)
    Bgra8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }
}

/// Owned raw color pixels with explicit geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColorImage {
    pub width: u32,
    pub height: u32,
    /// Bytes between the start of two consecutive rows
    pub stride: usize,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl RawColorImage {
    /// Tightly packed buffer (stride = width * bytes per pixel)
    pub fn packed(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width as usize * format.bytes_per_pixel(),
            format,
            data,
        }
    }

    /// Convert to a packed RGB image
    pub fn to_rgb_image(&self) -> Result<RgbImage, ArtifactError> {
        let bpp = self.format.bytes_per_pixel();
        let row_bytes = self.width as usize * bpp;

        if self.width == 0 || self.height == 0 || self.stride < row_bytes {
            return Err(ArtifactError::Encode(format!(
                "invalid color geometry {}x{} (stride {})",
                self.width, self.height, self.stride
            )));
        }

        let expected_size = self
            .stride
            .checked_mul(self.height as usize - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| {
                ArtifactError::Encode(format!(
                    "color stride {} overflows for {} rows",
                    self.stride, self.height
                ))
            })?;
        if self.data.len() < expected_size {
            return Err(ArtifactError::Encode(format!(
                "color data too small: expected {}, got {}",
                expected_size,
                self.data.len()
            )));
        }

        let mut rgb_data = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height as usize {
            let row = &self.data[y * self.stride..y * self.stride + row_bytes];
            match self.format {
                PixelFormat::Rgb8 => rgb_data.extend_from_slice(row),
                PixelFormat::Rgba8 => {
                    rgb_data.extend(row.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]))
                }
                PixelFormat::Bgra8 => {
                    rgb_data.extend(row.chunks_exact(4).flat_map(|p| [p[2], p[1], p[0]]))
                }
            }
        }

        debug!(
            width = self.width,
            height = self.height,
            format = ?self.format,
            "Color frame converted to RGB"
        );

        RgbImage::from_raw(self.width, self.height, rgb_data).ok_or_else(|| {
            ArtifactError::Encode("failed to create RGB image from converted data".to_string())
        })
    }
}

/// Color photograph as handed over by the capture backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorImage {
    /// Already compressed bytes (JPEG, HEIF-decoded PNG, ...)
    Encoded(Vec<u8>),
    /// Uncompressed pixels
    Raw(RawColorImage),
}
