// SPDX-License-Identifier: GPL-3.0-only

//! Capture record and camera calibration types

use crate::constants::{COLOR_IMAGE_SUFFIX, DEPTH_IMAGE_SUFFIX, METADATA_SUFFIX};
use crate::depth::{DepthRange, NormalizedDepthImage};
use crate::motion::MotionSample;
use crate::pipelines::photo::ColorImage;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pixel resolution a calibration was computed against
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Camera intrinsics tied to a reference resolution
///
/// `intrinsic_matrix` is row-major:
///
/// ```text
/// [fx  0 cx]
/// [ 0 fy cy]
/// [ 0  0  1]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationData {
    pub intrinsic_matrix: [[f32; 3]; 3],
    pub reference_dimensions: Dimensions,
}

impl CalibrationData {
    pub fn new(intrinsic_matrix: [[f32; 3]; 3], reference_dimensions: Dimensions) -> Self {
        Self {
            intrinsic_matrix,
            reference_dimensions,
        }
    }

    /// Build from pinhole parameters
    pub fn from_pinhole(fx: f32, fy: f32, cx: f32, cy: f32, reference: Dimensions) -> Self {
        Self::new([[fx, 0.0, cx], [0.0, fy, cy], [0.0, 0.0, 1.0]], reference)
    }

    pub fn matrix(&self) -> Matrix3<f32> {
        let m = &self.intrinsic_matrix;
        Matrix3::new(
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        )
    }

    /// (fx, fy)
    pub fn focal_length(&self) -> (f32, f32) {
        (self.intrinsic_matrix[0][0], self.intrinsic_matrix[1][1])
    }

    /// (cx, cy)
    pub fn principal_point(&self) -> (f32, f32) {
        (self.intrinsic_matrix[0][2], self.intrinsic_matrix[1][2])
    }

    /// Rescale the intrinsics to images of `width` x `height`
    ///
    /// Focal lengths and principal point scale with the resize factor of
    /// their axis. Returns `None` when the reference dimensions are not
    /// positive.
    pub fn scaled_to(&self, width: f32, height: f32) -> Option<Self> {
        let reference = self.reference_dimensions;
        if reference.width <= 0.0 || reference.height <= 0.0 {
            return None;
        }
        let scale = Matrix3::new(
            width / reference.width,
            0.0,
            0.0,
            0.0,
            height / reference.height,
            0.0,
            0.0,
            0.0,
            1.0,
        );
        let k = scale * self.matrix();
        let mut intrinsic_matrix = [[0.0f32; 3]; 3];
        for (r, row) in intrinsic_matrix.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = k[(r, c)];
            }
        }
        Some(Self::new(intrinsic_matrix, Dimensions::new(width, height)))
    }
}

/// Normalized depth image plus the range it was stretched over
#[derive(Debug, Clone, PartialEq)]
pub struct DepthLayer {
    pub image: NormalizedDepthImage,
    pub range: DepthRange,
}

/// Which file of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ColorImage,
    DepthImage,
    Metadata,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::ColorImage,
        ArtifactKind::DepthImage,
        ArtifactKind::Metadata,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::ColorImage => COLOR_IMAGE_SUFFIX,
            ArtifactKind::DepthImage => DEPTH_IMAGE_SUFFIX,
            ArtifactKind::Metadata => METADATA_SUFFIX,
        }
    }

    /// `<prefix><suffix>`
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.suffix())
    }

    /// Split a file name into its prefix and artifact kind
    pub fn parse_file_name(name: &str) -> Option<(&str, ArtifactKind)> {
        Self::ALL.iter().find_map(|kind| {
            name.strip_suffix(kind.suffix())
                .filter(|prefix| !prefix.is_empty())
                .map(|prefix| (prefix, *kind))
        })
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::ColorImage => write!(f, "color image"),
            ArtifactKind::DepthImage => write!(f, "depth image"),
            ArtifactKind::Metadata => write!(f, "metadata"),
        }
    }
}

/// Everything captured by one shutter press
///
/// Built once and consumed by [`super::CaptureRecordWriter::write`].
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub color: ColorImage,
    /// `None` when the depth map had no usable range
    pub depth: Option<DepthLayer>,
    pub calibration: CalibrationData,
    pub motion: Option<MotionSample>,
    /// Per-object folder all artifacts land in
    pub folder: PathBuf,
    /// Shared file name prefix of all artifacts
    pub prefix: String,
}

impl CaptureRecord {
    pub fn new(
        color: ColorImage,
        depth_image: NormalizedDepthImage,
        depth_range: DepthRange,
        calibration: CalibrationData,
        motion: Option<MotionSample>,
        folder: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            color,
            depth: Some(DepthLayer {
                image: depth_image,
                range: depth_range,
            }),
            calibration,
            motion,
            folder: folder.into(),
            prefix: prefix.into(),
        }
    }

    /// Record without depth; only color and metadata are written
    pub fn color_only(
        color: ColorImage,
        calibration: CalibrationData,
        motion: Option<MotionSample>,
        folder: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            color,
            depth: None,
            calibration,
            motion,
            folder: folder.into(),
            prefix: prefix.into(),
        }
    }

    /// `<folder>/<prefix><suffix>`
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.folder.join(kind.file_name(&self.prefix))
    }
}
