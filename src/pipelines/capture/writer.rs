// SPDX-License-Identifier: GPL-3.0-only

//! Capture record persistence
//!
//! Writes one capture as up to three sibling files sharing a prefix:
//!
//! ```text
//! <folder>/<prefix>_colorImage.jpg
//! <folder>/<prefix>_depthImage.png   (absent for color-only captures)
//! <folder>/<prefix>_metadata.json
//! ```
//!
//! The artifacts are encoded and written concurrently on blocking tasks.
//! A failing artifact does not stop its siblings; the outcome of each one
//! is returned in a [`WriteReport`]. Only folder creation and a full disk
//! abort the whole capture.

use super::metadata::CaptureMetadata;
use super::record::{ArtifactKind, CaptureRecord};
use crate::errors::{ArtifactError, StorageError};
use crate::pipelines::photo::{EncodingQuality, PhotoEncoder};
use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of writing one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    /// File written with this many bytes
    Written { bytes: usize },
    /// Nothing to write (no depth for a color-only capture)
    Skipped,
    Failed(ArtifactError),
}

impl ArtifactOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ArtifactOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub outcome: ArtifactOutcome,
}

/// Per-artifact outcome of a capture write
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub folder: PathBuf,
    pub prefix: String,
    /// Always one entry per [`ArtifactKind`], in [`ArtifactKind::ALL`] order
    pub artifacts: Vec<ArtifactReport>,
    pub completed_at: DateTime<Local>,
}

impl WriteReport {
    /// True when no artifact failed (skipped ones are fine)
    pub fn is_complete(&self) -> bool {
        !self.artifacts.iter().any(|a| a.outcome.is_failed())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.artifacts.iter().filter(|a| a.outcome.is_failed())
    }

    /// Paths of the files that were written
    pub fn written_paths(&self) -> impl Iterator<Item = &Path> {
        self.artifacts
            .iter()
            .filter(|a| matches!(a.outcome, ArtifactOutcome::Written { .. }))
            .map(|a| a.path.as_path())
    }

    pub fn outcome(&self, kind: ArtifactKind) -> Option<&ArtifactOutcome> {
        self.artifacts
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| &a.outcome)
    }
}

/// Why a single artifact task stopped
enum TaskFailure {
    Artifact(ArtifactError),
    DiskFull,
}

impl From<ArtifactError> for TaskFailure {
    fn from(err: ArtifactError) -> Self {
        TaskFailure::Artifact(err)
    }
}

type TaskResult = Result<usize, TaskFailure>;

/// Persists capture records to per-object folders
#[derive(Debug, Clone, Copy)]
pub struct CaptureRecordWriter {
    encoder: PhotoEncoder,
    embed_metadata: bool,
}

impl Default for CaptureRecordWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureRecordWriter {
    /// Maximum JPEG quality, metadata embedded in the depth PNG
    pub fn new() -> Self {
        Self {
            encoder: PhotoEncoder::new(),
            embed_metadata: true,
        }
    }

    pub fn with_settings(quality: EncodingQuality, embed_metadata: bool) -> Self {
        Self {
            encoder: PhotoEncoder::with_quality(quality),
            embed_metadata,
        }
    }

    /// Write all artifacts of `record`
    ///
    /// Returns `Err` only when the folder cannot be created, the prefix is
    /// unusable, or the disk filled up. In the disk-full case the files of
    /// this capture are removed again.
    pub async fn write(&self, record: CaptureRecord) -> Result<WriteReport, StorageError> {
        validate_prefix(&record.prefix)?;

        tokio::fs::create_dir_all(&record.folder)
            .await
            .map_err(|e| StorageError::CreateFolder {
                path: record.folder.clone(),
                message: e.to_string(),
            })?;

        info!(
            folder = %record.folder.display(),
            prefix = %record.prefix,
            "Writing capture"
        );

        let metadata_text = CaptureMetadata::from_record(&record).to_json_pretty();
        let description = match (&metadata_text, self.embed_metadata) {
            (Ok(text), true) => Some(text.clone()),
            _ => None,
        };

        let color_path = record.artifact_path(ArtifactKind::ColorImage);
        let depth_path = record.artifact_path(ArtifactKind::DepthImage);
        let metadata_path = record.artifact_path(ArtifactKind::Metadata);

        let CaptureRecord {
            color,
            depth,
            folder,
            prefix,
            ..
        } = record;

        let encoder = self.encoder;
        let color_task = {
            let path = color_path.clone();
            tokio::task::spawn_blocking(move || -> TaskResult {
                let bytes = encoder.encode_color(&color)?;
                write_artifact(&path, &bytes)
            })
        };

        let depth_task = depth.map(|layer| {
            let path = depth_path.clone();
            tokio::task::spawn_blocking(move || -> TaskResult {
                let bytes = PhotoEncoder::encode_depth_png(&layer.image, description.as_deref())?;
                write_artifact(&path, &bytes)
            })
        });

        let metadata_task = {
            let path = metadata_path.clone();
            tokio::task::spawn_blocking(move || -> TaskResult {
                let text = metadata_text?;
                write_artifact(&path, text.as_bytes())
            })
        };

        let (color_result, depth_result, metadata_result) = tokio::join!(
            join_artifact(color_task),
            async {
                match depth_task {
                    Some(task) => Some(join_artifact(task).await),
                    None => None,
                }
            },
            join_artifact(metadata_task),
        );

        let mut disk_full = false;
        let mut artifacts = Vec::with_capacity(ArtifactKind::ALL.len());
        for (kind, path, result) in [
            (ArtifactKind::ColorImage, color_path, Some(color_result)),
            (ArtifactKind::DepthImage, depth_path, depth_result),
            (ArtifactKind::Metadata, metadata_path, Some(metadata_result)),
        ] {
            let outcome = match result {
                None => ArtifactOutcome::Skipped,
                Some(Ok(bytes)) => {
                    info!(artifact = %kind, path = %path.display(), bytes, "Artifact saved");
                    ArtifactOutcome::Written { bytes }
                }
                Some(Err(TaskFailure::Artifact(err))) => {
                    warn!(artifact = %kind, path = %path.display(), error = %err, "Artifact failed");
                    ArtifactOutcome::Failed(err)
                }
                Some(Err(TaskFailure::DiskFull)) => {
                    warn!(artifact = %kind, path = %path.display(), "Disk full");
                    disk_full = true;
                    ArtifactOutcome::Failed(ArtifactError::Io("disk full".to_string()))
                }
            };
            artifacts.push(ArtifactReport {
                kind,
                path,
                outcome,
            });
        }

        if disk_full {
            discard_artifacts(&artifacts).await;
            return Err(StorageError::DiskFull { path: folder });
        }

        let report = WriteReport {
            folder,
            prefix,
            artifacts,
            completed_at: Local::now(),
        };

        debug!(
            complete = report.is_complete(),
            failed = report.failures().count(),
            "Capture write finished"
        );

        Ok(report)
    }
}

/// A prefix must name files inside the folder, never a path out of it
fn validate_prefix(prefix: &str) -> Result<(), StorageError> {
    let bad = prefix.is_empty()
        || prefix == "."
        || prefix == ".."
        || prefix.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

fn write_artifact(path: &Path, bytes: &[u8]) -> TaskResult {
    match std::fs::write(path, bytes) {
        Ok(()) => Ok(bytes.len()),
        Err(e) if e.kind() == ErrorKind::StorageFull => Err(TaskFailure::DiskFull),
        Err(e) => Err(TaskFailure::Artifact(e.into())),
    }
}

async fn join_artifact(task: JoinHandle<TaskResult>) -> TaskResult {
    task.await
        .map_err(|e| TaskFailure::Artifact(ArtifactError::Task(e.to_string())))?
}

/// Remove whatever got written; a capture interrupted by a full disk is invalid
async fn discard_artifacts(artifacts: &[ArtifactReport]) {
    for artifact in artifacts {
        if matches!(artifact.outcome, ArtifactOutcome::Skipped) {
            continue;
        }
        if let Err(e) = tokio::fs::remove_file(&artifact.path).await
            && e.kind() != ErrorKind::NotFound
        {
            warn!(path = %artifact.path.display(), error = %e, "Failed to remove partial artifact");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_validation() {
        assert!(validate_prefix("frame_1").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("..").is_err());
        assert!(validate_prefix("a/b").is_err());
        assert!(validate_prefix("a\\b").is_err());
    }

    #[test]
    fn test_report_helpers() {
        let report = WriteReport {
            folder: PathBuf::from("Chair"),
            prefix: "frame_1".into(),
            artifacts: vec![
                ArtifactReport {
                    kind: ArtifactKind::ColorImage,
                    path: PathBuf::from("Chair/frame_1_colorImage.jpg"),
                    outcome: ArtifactOutcome::Failed(ArtifactError::Encode("bad".into())),
                },
                ArtifactReport {
                    kind: ArtifactKind::DepthImage,
                    path: PathBuf::from("Chair/frame_1_depthImage.png"),
                    outcome: ArtifactOutcome::Skipped,
                },
                ArtifactReport {
                    kind: ArtifactKind::Metadata,
                    path: PathBuf::from("Chair/frame_1_metadata.json"),
                    outcome: ArtifactOutcome::Written { bytes: 10 },
                },
            ],
            completed_at: Local::now(),
        };
        assert!(!report.is_complete());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            report.written_paths().collect::<Vec<_>>(),
            vec![Path::new("Chair/frame_1_metadata.json")]
        );
        assert_eq!(
            report.outcome(ArtifactKind::DepthImage),
            Some(&ArtifactOutcome::Skipped)
        );
    }
}
