// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding for capture artifacts
//!
//! ```text
//! ColorImage (encoded or raw) → RGB → JPEG
//! NormalizedDepthImage        → grayscale PNG (+ metadata text chunk)
//! ```

pub mod encoding;
pub mod processing;

pub use encoding::{EncodingQuality, PhotoEncoder, decode_depth_png, read_png_text};
pub use processing::{ColorImage, PixelFormat, RawColorImage};
