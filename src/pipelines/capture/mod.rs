// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipeline
//!
//! ```text
//! color + depth map + calibration + motion
//!         ↓
//! process_depth_map (locked) → CaptureRecord → CaptureRecordWriter
//!                                                   ↓
//!                     <object>/<prefix>_{colorImage.jpg,depthImage.png,metadata.json}
//! ```
//!
//! One capture is processed start to finish before the next is accepted.
//! A capture whose depth map has no usable range is still written, as
//! color + metadata only.

mod metadata;
mod reader;
mod record;
mod writer;

pub use metadata::{CaptureMetadata, MotionMetadata};
pub use reader::{
    CaptureFiles, list_captures, load_metric_depth, next_prefix, read_depth_image,
    read_embedded_metadata, read_metadata,
};
pub use record::{ArtifactKind, CalibrationData, CaptureRecord, DepthLayer, Dimensions};
pub use writer::{ArtifactOutcome, ArtifactReport, CaptureRecordWriter, WriteReport};

use crate::config::Config;
use crate::depth::{DepthMapSource, DepthRange, process_depth_map};
use crate::errors::{AppResult, DepthError, StorageError};
use crate::motion::MotionTracker;
use crate::pipelines::photo::ColorImage;
use crate::storage::object_folder;
use std::path::PathBuf;
use tracing::{info, warn};

/// Inputs of one shutter press, besides the depth map
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub color: ColorImage,
    pub calibration: CalibrationData,
    /// Object folder label; the configured default when `None`
    pub object_label: Option<String>,
    /// File prefix; the next free `<stem>_<N>` when `None`
    pub prefix: Option<String>,
}

/// Result of a finished capture
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub report: WriteReport,
    /// `None` for a color-only capture
    pub depth_range: Option<DepthRange>,
}

/// Orchestrates normalize → assemble → write
pub struct CapturePipeline {
    writer: CaptureRecordWriter,
    motion: MotionTracker,
    output_root: PathBuf,
    default_label: String,
    prefix_stem: String,
}

impl CapturePipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            writer: CaptureRecordWriter::with_settings(
                config.color_quality,
                config.embed_metadata_in_png,
            ),
            motion: MotionTracker::new(),
            output_root: config.output_root.clone(),
            default_label: config.default_object_label.clone(),
            prefix_stem: config.prefix_stem.clone(),
        }
    }

    /// Motion tracker fed by the motion subsystem between captures
    pub fn motion_mut(&mut self) -> &mut MotionTracker {
        &mut self.motion
    }

    pub fn motion(&self) -> &MotionTracker {
        &self.motion
    }

    /// Folder a label resolves to
    pub fn object_folder(&self, label: Option<&str>) -> PathBuf {
        object_folder(
            &self.output_root,
            label.unwrap_or(&self.default_label),
            &self.default_label,
        )
    }

    /// Normalize `depth`, snapshot motion and write the capture
    ///
    /// `depth` is locked only while it is scanned and normalized. An empty
    /// or flat depth map is not an error: the capture is stored without a
    /// depth image. Any error leaves the pipeline ready for the next capture.
    pub async fn capture<S: DepthMapSource + ?Sized>(
        &self,
        request: CaptureRequest,
        depth: Option<&S>,
    ) -> AppResult<CaptureOutcome> {
        let layer = match depth.map(process_depth_map) {
            Some(Ok((image, range))) => Some(DepthLayer { image, range }),
            Some(Err(DepthError::EmptyRange)) => {
                warn!("No valid depth data found, storing color only");
                None
            }
            Some(Err(e)) => return Err(e.into()),
            None => None,
        };

        let folder = self.object_folder(request.object_label.as_deref());
        let prefix = match request.prefix {
            Some(prefix) => prefix,
            None => {
                let folder = folder.clone();
                let stem = self.prefix_stem.clone();
                tokio::task::spawn_blocking(move || next_prefix(&folder, &stem))
                    .await
                    .map_err(|e| StorageError::Read {
                        path: self.output_root.clone(),
                        message: e.to_string(),
                    })??
            }
        };

        let depth_range = layer.as_ref().map(|l| l.range);
        let record = CaptureRecord {
            color: request.color,
            depth: layer,
            calibration: request.calibration,
            motion: self.motion.current_sample(),
            folder,
            prefix,
        };

        let report = self.writer.write(record).await?;
        info!(
            folder = %report.folder.display(),
            prefix = %report.prefix,
            complete = report.is_complete(),
            "Capture stored"
        );

        Ok(CaptureOutcome {
            report,
            depth_range,
        })
    }
}
