// SPDX-License-Identifier: GPL-3.0-only

//! Depth map normalization
//!
//! Converts raw 32-bit float depth samples into an 8-bit grayscale image by
//! stretching the observed depth range over 0..=255:
//!
//! ```text
//! DepthMapSource → lock → compute_range → normalize → unlock
//!                                ↓
//!                          DepthRange (stored in metadata)
//! ```
//!
//! The stretch is relative to each capture's own range, so gray levels are
//! not comparable between captures. The range is stored alongside the image
//! so metric depth can be recovered with [`denormalize_depth`].

mod buffer;
mod normalize;

pub use buffer::{DepthBuffer, DepthMapLock, DepthMapSource, OwnedDepthMap};
pub use normalize::{
    DepthRange, NormalizedDepthImage, compute_range, denormalize_depth, normalize,
    process_depth_map,
};
