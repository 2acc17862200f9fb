// SPDX-License-Identifier: GPL-3.0-only

//! Depth sample buffers and the read-only lock bracket around them

use crate::errors::DepthError;
use tracing::debug;

/// Borrowed view over row-major 32-bit float depth samples
///
/// Rows may be padded: `stride` is the number of samples between the start
/// of two consecutive rows and is at least `width`. Padding is never read.
#[derive(Debug, Clone, Copy)]
pub struct DepthBuffer<'a> {
    width: u32,
    height: u32,
    stride: usize,
    samples: &'a [f32],
}

impl<'a> DepthBuffer<'a> {
    /// Create a tightly packed buffer holding exactly `width * height` samples
    pub fn new(width: u32, height: u32, samples: &'a [f32]) -> Result<Self, DepthError> {
        let buffer = Self::with_stride(width, height, width as usize, samples)?;
        let expected = buffer.pixel_count();
        if samples.len() != expected {
            return Err(DepthError::BufferSizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(buffer)
    }

    /// Create a buffer whose rows are `stride` samples apart
    pub fn with_stride(
        width: u32,
        height: u32,
        stride: usize,
        samples: &'a [f32],
    ) -> Result<Self, DepthError> {
        if width == 0 || height == 0 || stride < width as usize {
            return Err(DepthError::InvalidDimensions {
                width,
                height,
                stride,
            });
        }

        // The last row does not need trailing padding
        let expected = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(width as usize))
            .ok_or(DepthError::InvalidDimensions {
                width,
                height,
                stride,
            })?;
        if samples.len() < expected {
            return Err(DepthError::BufferSizeMismatch {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of pixels (`width * height`), excluding row padding
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Iterate over rows, each exactly `width` samples long
    pub fn rows(self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let samples = self.samples;
        let width = self.width as usize;
        let stride = self.stride;
        (0..self.height as usize).map(move |y| &samples[y * stride..y * stride + width])
    }

    /// Iterate over all samples in row-major order
    pub fn samples(self) -> impl Iterator<Item = f32> + 'a {
        self.rows().flat_map(|row| row.iter().copied())
    }
}

/// A platform depth map whose memory must be locked before reading
///
/// Implementations wrap whatever the capture backend hands over (a pixel
/// buffer from the camera framework, a memory-mapped file, a plain vector).
pub trait DepthMapSource {
    /// Width and height in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Samples between the start of two consecutive rows
    fn stride(&self) -> usize {
        self.dimensions().0 as usize
    }

    /// Lock the sample memory for reading
    fn lock_read_only(&self) -> Result<(), DepthError>;

    /// Release a lock taken by [`DepthMapSource::lock_read_only`]
    fn unlock_read_only(&self);

    /// Sample memory. Only valid while locked.
    fn locked_samples(&self) -> &[f32];
}

/// RAII bracket around a locked [`DepthMapSource`]
///
/// The source is unlocked when the guard is dropped, on every exit path.
pub struct DepthMapLock<'a, S: DepthMapSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: DepthMapSource + ?Sized> DepthMapLock<'a, S> {
    /// Lock `source` for reading
    pub fn acquire(source: &'a S) -> Result<Self, DepthError> {
        source.lock_read_only()?;
        debug!("Depth buffer locked");
        Ok(Self { source })
    }

    /// View the locked samples; the view cannot outlive the lock
    pub fn buffer(&self) -> Result<DepthBuffer<'_>, DepthError> {
        let (width, height) = self.source.dimensions();
        DepthBuffer::with_stride(
            width,
            height,
            self.source.stride(),
            self.source.locked_samples(),
        )
    }
}

impl<S: DepthMapSource + ?Sized> Drop for DepthMapLock<'_, S> {
    fn drop(&mut self) {
        self.source.unlock_read_only();
        debug!("Depth buffer unlocked");
    }
}

/// Depth map held in an owned vector; locking is a no-op
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedDepthMap {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl OwnedDepthMap {
    /// Wrap `width * height` samples in row-major order
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, DepthError> {
        DepthBuffer::new(width, height, &samples)?;
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Decode little-endian f32 samples, as written by depth dump tools
    pub fn from_le_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, DepthError> {
        if bytes.len() % 4 != 0 {
            return Err(DepthError::BufferSizeMismatch {
                expected: width as usize * height as usize * 4,
                actual: bytes.len(),
            });
        }
        let samples = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::new(width, height, samples)
    }

    pub fn as_buffer(&self) -> DepthBuffer<'_> {
        DepthBuffer {
            width: self.width,
            height: self.height,
            stride: self.width as usize,
            samples: &self.samples,
        }
    }
}

impl DepthMapSource for OwnedDepthMap {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn lock_read_only(&self) -> Result<(), DepthError> {
        Ok(())
    }

    fn unlock_read_only(&self) {}

    fn locked_samples(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_rejects_zero_dimensions() {
        let err = DepthBuffer::new(0, 2, &[]).unwrap_err();
        assert!(matches!(err, DepthError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_buffer_rejects_short_slice() {
        let samples = [1.0f32; 3];
        let err = DepthBuffer::new(2, 2, &samples).unwrap_err();
        assert_eq!(
            err,
            DepthError::BufferSizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_buffer_rejects_overflowing_stride() {
        let samples = [1.0f32, 2.0];
        let err = DepthBuffer::with_stride(1, 3, usize::MAX / 2 + 1, &samples).unwrap_err();
        assert!(matches!(err, DepthError::InvalidDimensions { height: 3, .. }));
    }

    #[test]
    fn test_strided_rows_skip_padding() {
        // 2x2 image with one padding sample per row
        let samples = [1.0, 2.0, -99.0, 3.0, 4.0];
        let buffer = DepthBuffer::with_stride(2, 2, 3, &samples).unwrap();
        let values: Vec<f32> = buffer.samples().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_from_le_bytes() {
        let bytes: Vec<u8> = [1.5f32, f32::NAN]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let map = OwnedDepthMap::from_le_bytes(2, 1, &bytes).unwrap();
        let values: Vec<f32> = map.as_buffer().samples().collect();
        assert_eq!(values[0], 1.5);
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_from_le_bytes_rejects_ragged_input() {
        assert!(OwnedDepthMap::from_le_bytes(1, 1, &[0, 0, 0]).is_err());
    }
}
