// SPDX-License-Identifier: GPL-3.0-only

//! Capture metadata document (`<prefix>_metadata.json`)
//!
//! ```json
//! {
//!   "minDepth": 0.41,
//!   "maxDepth": 1.98,
//!   "cameraIntrinsics": [[fx, 0, cx], [0, fy, cy], [0, 0, 1]],
//!   "cameraReferenceDimensions": { "width": 4032, "height": 3024 },
//!   "motionMetadata": {
//!     "orientation": { "roll": 0.0, "pitch": 0.0, "yaw": 0.0 },
//!     "acceleration": { "x": 0.0, "y": 0.0, "z": 0.0 }
//!   }
//! }
//! ```
//!
//! Depth keys are absent for color-only captures; `motionMetadata` is absent
//! when no motion reading was available.

use super::record::{CalibrationData, CaptureRecord, Dimensions};
use crate::depth::DepthRange;
use crate::errors::ArtifactError;
use crate::motion::{Acceleration, Attitude, MotionSample};
use serde::{Deserialize, Serialize};

/// Motion block of the metadata document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionMetadata {
    pub orientation: Attitude,
    pub acceleration: Acceleration,
}

impl From<MotionSample> for MotionMetadata {
    fn from(sample: MotionSample) -> Self {
        Self {
            orientation: sample.orientation(),
            acceleration: sample.acceleration(),
        }
    }
}

impl From<MotionMetadata> for MotionSample {
    fn from(meta: MotionMetadata) -> Self {
        MotionSample::new(meta.orientation, meta.acceleration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_depth: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<f32>,
    /// Row-major 3x3 intrinsics
    pub camera_intrinsics: [[f32; 3]; 3],
    pub camera_reference_dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_metadata: Option<MotionMetadata>,
}

impl CaptureMetadata {
    pub fn from_record(record: &CaptureRecord) -> Self {
        let range = record.depth.as_ref().map(|layer| layer.range);
        Self {
            min_depth: range.map(|r| r.min),
            max_depth: range.map(|r| r.max),
            camera_intrinsics: record.calibration.intrinsic_matrix,
            camera_reference_dimensions: record.calibration.reference_dimensions,
            motion_metadata: record.motion.map(MotionMetadata::from),
        }
    }

    /// The stored depth range, if both ends are present and usable
    pub fn depth_range(&self) -> Option<DepthRange> {
        DepthRange::new(self.min_depth?, self.max_depth?).ok()
    }

    pub fn calibration(&self) -> CalibrationData {
        CalibrationData::new(self.camera_intrinsics, self.camera_reference_dimensions)
    }

    pub fn motion(&self) -> Option<MotionSample> {
        self.motion_metadata.map(MotionSample::from)
    }

    /// Pretty-printed JSON text
    ///
    /// JSON has no NaN or infinity; a non-finite value would be written as
    /// `null` and the document could not be read back, so it is rejected.
    pub fn to_json_pretty(&self) -> Result<String, ArtifactError> {
        if let Some(field) = self.first_non_finite() {
            return Err(ArtifactError::Encode(format!(
                "metadata field {} is not finite",
                field
            )));
        }
        serde_json::to_string_pretty(self)
            .map_err(|e| ArtifactError::Encode(format!("metadata serialization failed: {}", e)))
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn first_non_finite(&self) -> Option<&'static str> {
        let depth = [self.min_depth, self.max_depth];
        if depth.iter().flatten().any(|v| !v.is_finite()) {
            return Some("minDepth/maxDepth");
        }
        if self.camera_intrinsics.iter().flatten().any(|v| !v.is_finite()) {
            return Some("cameraIntrinsics");
        }
        let dims = self.camera_reference_dimensions;
        if !dims.width.is_finite() || !dims.height.is_finite() {
            return Some("cameraReferenceDimensions");
        }
        if let Some(motion) = &self.motion_metadata {
            let MotionMetadata {
                orientation: o,
                acceleration: a,
            } = motion;
            if [o.roll, o.pitch, o.yaw, a.x, a.y, a.z].iter().any(|v| !v.is_finite()) {
                return Some("motionMetadata");
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::NormalizedDepthImage;
    use crate::pipelines::photo::ColorImage;

    fn calibration() -> CalibrationData {
        CalibrationData::from_pinhole(
            2742.5,
            2742.5,
            2015.25,
            1511.75,
            Dimensions::new(4032.0, 3024.0),
        )
    }

    #[test]
    fn test_schema_keys() {
        let record = CaptureRecord::new(
            ColorImage::Encoded(Vec::new()),
            NormalizedDepthImage::from_raw(1, 1, vec![0]).unwrap(),
            DepthRange::new(0.5, 2.0).unwrap(),
            calibration(),
            Some(MotionSample::new(
                Attitude::new(0.1, 0.2, 0.3),
                Acceleration::new(0.0, -0.5, 0.25),
            )),
            "Chair",
            "frame_1",
        );
        let text = CaptureMetadata::from_record(&record).to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["minDepth"], 0.5);
        assert_eq!(value["maxDepth"], 2.0);
        assert_eq!(value["cameraIntrinsics"][0][0], 2742.5);
        assert_eq!(value["cameraIntrinsics"][1][2], 1511.75);
        assert_eq!(value["cameraIntrinsics"][2][2], 1.0);
        assert_eq!(value["cameraReferenceDimensions"]["width"], 4032.0);
        assert_eq!(value["motionMetadata"]["orientation"]["yaw"], 0.3);
        assert_eq!(value["motionMetadata"]["acceleration"]["y"], -0.5);
    }

    #[test]
    fn test_color_only_omits_depth_and_motion() {
        let record = CaptureRecord::color_only(
            ColorImage::Encoded(Vec::new()),
            calibration(),
            None,
            "Chair",
            "frame_2",
        );
        let meta = CaptureMetadata::from_record(&record);
        let value = serde_json::to_value(&meta).unwrap();
        assert!(value.get("minDepth").is_none());
        assert!(value.get("motionMetadata").is_none());
        assert!(meta.depth_range().is_none());
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let mut calib = calibration();
        calib.intrinsic_matrix[0][2] = f32::NAN;
        let record = CaptureRecord::color_only(
            ColorImage::Encoded(Vec::new()),
            calib,
            None,
            "Chair",
            "frame_1",
        );
        let result = CaptureMetadata::from_record(&record).to_json_pretty();
        assert!(matches!(result, Err(ArtifactError::Encode(msg)) if msg.contains("cameraIntrinsics")));

        let record = CaptureRecord::color_only(
            ColorImage::Encoded(Vec::new()),
            calibration(),
            Some(MotionSample::new(
                Attitude::new(0.0, f64::INFINITY, 0.0),
                Acceleration::default(),
            )),
            "Chair",
            "frame_1",
        );
        let result = CaptureMetadata::from_record(&record).to_json_pretty();
        assert!(matches!(result, Err(ArtifactError::Encode(msg)) if msg.contains("motionMetadata")));
    }

    #[test]
    fn test_parse_written_document() {
        let text = r#"{
            "minDepth": 0.25,
            "maxDepth": 1.5,
            "cameraIntrinsics": [[1.0, 0.0, 2.0], [0.0, 3.0, 4.0], [0.0, 0.0, 1.0]],
            "cameraReferenceDimensions": {"width": 640, "height": 480}
        }"#;
        let meta = CaptureMetadata::from_json(text).unwrap();
        assert_eq!(meta.depth_range(), Some(DepthRange { min: 0.25, max: 1.5 }));
        assert_eq!(meta.calibration().principal_point(), (2.0, 4.0));
        assert!(meta.motion().is_none());
    }
}
