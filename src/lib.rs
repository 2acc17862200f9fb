// SPDX-License-Identifier: GPL-3.0-only

//! Depth Capture - storage core for color + LiDAR depth photographs
//!
//! Converts raw floating-point depth maps into 8-bit grayscale images and
//! persists each capture (color photo, depth image, calibration and motion
//! metadata) into a per-object folder.
//!
//! # Architecture
//!
//! - [`depth`]: Depth range scanning and normalization
//! - [`motion`]: Device motion relative to a reference attitude
//! - [`pipelines`]: Photo encoding and the capture writer/reader
//! - [`config`]: User configuration handling
//! - [`storage`]: Output folders and capture lookup
//!
//! # Example
//!
//! ```no_run
//! use depth_capture::depth::OwnedDepthMap;
//! use depth_capture::pipelines::capture::{CalibrationData, CapturePipeline, CaptureRequest, Dimensions};
//! use depth_capture::pipelines::photo::ColorImage;
//!
//! # async fn run() -> depth_capture::AppResult<()> {
//! let config = depth_capture::Config::default();
//! let pipeline = CapturePipeline::new(&config);
//! let depth = OwnedDepthMap::new(2, 2, vec![1.0, 2.0, f32::NAN, 3.0])?;
//! let request = CaptureRequest {
//!     color: ColorImage::Encoded(std::fs::read("photo.jpg")?),
//!     calibration: CalibrationData::from_pinhole(500.0, 500.0, 1.0, 1.0, Dimensions::new(2.0, 2.0)),
//!     object_label: Some("Chair".into()),
//!     prefix: None,
//! };
//! let outcome = pipeline.capture(request, Some(&depth)).await?;
//! println!("{} complete: {}", outcome.report.prefix, outcome.report.is_complete());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod depth;
pub mod errors;
pub mod motion;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use pipelines::capture::{CaptureRecord, CaptureRecordWriter, WriteReport};
