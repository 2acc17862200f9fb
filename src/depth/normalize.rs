// SPDX-License-Identifier: GPL-3.0-only

//! Linear stretch of depth samples to 8-bit grayscale

use super::buffer::{DepthBuffer, DepthMapLock, DepthMapSource};
use crate::constants::DEPTH_GRAY_MAX;
use crate::errors::DepthError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Depth range observed over the finite samples of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub min: f32,
    pub max: f32,
}

impl DepthRange {
    /// Build a usable range: both ends finite and `min < max`
    pub fn new(min: f32, max: f32) -> Result<Self, DepthError> {
        if min.is_finite() && max.is_finite() && min < max {
            Ok(Self { min, max })
        } else {
            Err(DepthError::EmptyRange)
        }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Single-channel 8-bit depth image, row-major, no padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDepthImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl NormalizedDepthImage {
    /// Wrap pixels for an image of the given size
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Scan all finite samples for their minimum and maximum
///
/// Non-finite samples (NaN, ±inf) are unmeasured pixels and are skipped.
/// Fails with [`DepthError::EmptyRange`] when no finite sample exists or
/// when every finite sample has the same value.
pub fn compute_range(buffer: &DepthBuffer<'_>) -> Result<DepthRange, DepthError> {
    let (min, max) = buffer
        .samples()
        .filter(|d| d.is_finite())
        .fold((f32::MAX, f32::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));

    let range = DepthRange::new(min, max)?;
    debug!(min = range.min, max = range.max, "Depth range computed");
    Ok(range)
}

/// Stretch `buffer` over 0..=255 using `range`
///
/// Finite samples map to `round(255 * (d - min) / (max - min))`, rounding
/// half up and clamping to 0..=255. Non-finite samples map to 0. The math
/// runs in f64 so identical inputs always give identical bytes.
pub fn normalize(buffer: &DepthBuffer<'_>, range: DepthRange) -> NormalizedDepthImage {
    let min = range.min as f64;
    let span = range.max as f64 - min;

    let pixels = buffer
        .samples()
        .map(|d| {
            if !d.is_finite() || span <= 0.0 {
                return 0;
            }
            let scaled = DEPTH_GRAY_MAX * (d as f64 - min) / span;
            (scaled + 0.5).floor().clamp(0.0, DEPTH_GRAY_MAX) as u8
        })
        .collect();

    NormalizedDepthImage {
        width: buffer.width(),
        height: buffer.height(),
        pixels,
    }
}

/// Lock `source`, compute its range and normalize it, then unlock
///
/// The lock is released on every path, including an empty range.
pub fn process_depth_map<S: DepthMapSource + ?Sized>(
    source: &S,
) -> Result<(NormalizedDepthImage, DepthRange), DepthError> {
    let lock = DepthMapLock::acquire(source)?;
    let buffer = lock.buffer()?;
    let range = compute_range(&buffer)?;
    let image = normalize(&buffer, range);
    Ok((image, range))
}

/// Recover metric depth from a normalized image and its stored range
///
/// Gray level 0 maps back to `range.min`; invalid pixels cannot be told
/// apart from the nearest depth once normalized.
pub fn denormalize_depth(image: &NormalizedDepthImage, range: DepthRange) -> Vec<f32> {
    let min = range.min as f64;
    let span = range.max as f64 - min;
    image
        .pixels
        .iter()
        .map(|&v| (min + v as f64 / DEPTH_GRAY_MAX * span) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn buffer(samples: &[f32], width: u32, height: u32) -> DepthBuffer<'_> {
        DepthBuffer::new(width, height, samples).unwrap()
    }

    #[test]
    fn test_reference_two_by_two() {
        let samples = [1.0, 2.0, f32::NAN, 3.0];
        let buf = buffer(&samples, 2, 2);
        let range = compute_range(&buf).unwrap();
        assert_eq!(range, DepthRange { min: 1.0, max: 3.0 });

        let image = normalize(&buf, range);
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 2);
        // 127.5 rounds half up
        assert_eq!(image.pixels, vec![0, 128, 0, 255]);
    }

    #[test]
    fn test_range_ignores_non_finite() {
        let samples = [f32::INFINITY, 0.5, f32::NEG_INFINITY, 2.5, f32::NAN, 1.0];
        let range = compute_range(&buffer(&samples, 3, 2)).unwrap();
        assert_eq!(range.min, 0.5);
        assert_eq!(range.max, 2.5);
    }

    #[test]
    fn test_all_non_finite_is_empty_range() {
        let samples = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, f32::NAN];
        assert_eq!(
            compute_range(&buffer(&samples, 2, 2)),
            Err(DepthError::EmptyRange)
        );
    }

    #[test]
    fn test_flat_field_is_empty_range() {
        let samples = [1.25, f32::NAN, 1.25, 1.25];
        assert_eq!(
            compute_range(&buffer(&samples, 2, 2)),
            Err(DepthError::EmptyRange)
        );
    }

    #[test]
    fn test_extremes_map_to_bounds() {
        let samples = [0.3, 4.7, 2.0, 0.3, 4.7, 3.1];
        let buf = buffer(&samples, 3, 2);
        let range = compute_range(&buf).unwrap();
        let image = normalize(&buf, range);
        assert_eq!(image.pixels[0], 0);
        assert_eq!(image.pixels[1], 255);
        assert_eq!(image.pixels[3], 0);
        assert_eq!(image.pixels[4], 255);
    }

    #[test]
    fn test_non_finite_is_zero_for_any_range() {
        let samples = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 5.0];
        let buf = buffer(&samples, 4, 1);
        let range = DepthRange::new(-10.0, 10.0).unwrap();
        let image = normalize(&buf, range);
        assert_eq!(&image.pixels[..3], &[0, 0, 0]);
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        let samples = [-5.0, 50.0];
        let buf = buffer(&samples, 2, 1);
        let image = normalize(&buf, DepthRange::new(0.0, 1.0).unwrap());
        assert_eq!(image.pixels, vec![0, 255]);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let samples: Vec<f32> = (0..64).map(|i| 0.25 + (i as f32 * 0.173).sin().abs()).collect();
        let buf = buffer(&samples, 8, 8);
        let range = compute_range(&buf).unwrap();
        let first = normalize(&buf, range);
        let second = normalize(&buf, range);
        assert_eq!(first, second);
        assert_eq!(first.pixels.len(), 64);
    }

    #[test]
    fn test_denormalize_restores_range_ends() {
        let image = NormalizedDepthImage::from_raw(3, 1, vec![0, 255, 51]).unwrap();
        let depth = denormalize_depth(&image, DepthRange::new(1.0, 6.0).unwrap());
        assert_eq!(depth[0], 1.0);
        assert_eq!(depth[1], 6.0);
        assert!((depth[2] - 2.0).abs() < 1e-6);
    }

    /// Counts lock/unlock calls; samples readable only while locked
    struct CountingSource {
        samples: Vec<f32>,
        locks: Cell<u32>,
        unlocks: Cell<u32>,
    }

    impl DepthMapSource for CountingSource {
        fn dimensions(&self) -> (u32, u32) {
            (2, 2)
        }

        fn lock_read_only(&self) -> Result<(), DepthError> {
            self.locks.set(self.locks.get() + 1);
            Ok(())
        }

        fn unlock_read_only(&self) {
            self.unlocks.set(self.unlocks.get() + 1);
        }

        fn locked_samples(&self) -> &[f32] {
            assert!(self.locks.get() > self.unlocks.get(), "read outside lock");
            &self.samples
        }
    }

    fn counting(samples: Vec<f32>) -> CountingSource {
        CountingSource {
            samples,
            locks: Cell::new(0),
            unlocks: Cell::new(0),
        }
    }

    #[test]
    fn test_process_unlocks_on_success() {
        let source = counting(vec![1.0, 2.0, f32::NAN, 3.0]);
        let (image, range) = process_depth_map(&source).unwrap();
        assert_eq!(image.pixels, vec![0, 128, 0, 255]);
        assert_eq!(range.max, 3.0);
        assert_eq!((source.locks.get(), source.unlocks.get()), (1, 1));
    }

    #[test]
    fn test_process_unlocks_on_empty_range() {
        let source = counting(vec![f32::NAN; 4]);
        assert_eq!(process_depth_map(&source), Err(DepthError::EmptyRange));
        assert_eq!((source.locks.get(), source.unlocks.get()), (1, 1));
    }

    #[test]
    fn test_process_unlocks_on_bad_size() {
        let source = counting(vec![1.0, 2.0]);
        assert!(matches!(
            process_depth_map(&source),
            Err(DepthError::BufferSizeMismatch { .. })
        ));
        assert_eq!((source.locks.get(), source.unlocks.get()), (1, 1));
    }

    struct WideStrideSource(Vec<f32>);

    impl DepthMapSource for WideStrideSource {
        fn dimensions(&self) -> (u32, u32) {
            (1, 3)
        }

        fn stride(&self) -> usize {
            usize::MAX / 2 + 1
        }

        fn lock_read_only(&self) -> Result<(), DepthError> {
            Ok(())
        }

        fn unlock_read_only(&self) {}

        fn locked_samples(&self) -> &[f32] {
            &self.0
        }
    }

    #[test]
    fn test_process_rejects_overflowing_stride() {
        let source = WideStrideSource(vec![1.0, 2.0]);
        assert!(matches!(
            process_depth_map(&source),
            Err(DepthError::InvalidDimensions { .. })
        ));
    }
}
