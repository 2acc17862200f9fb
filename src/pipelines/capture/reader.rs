// SPDX-License-Identifier: GPL-3.0-only

//! Reading captures back from an object folder
//!
//! Export tooling only relies on the file naming contract: every artifact
//! of a capture starts with the same prefix and lives in the same folder.

use super::metadata::CaptureMetadata;
use super::record::ArtifactKind;
use crate::constants::PNG_METADATA_KEYWORD;
use crate::depth::{NormalizedDepthImage, denormalize_depth};
use crate::errors::StorageError;
use crate::pipelines::photo::{decode_depth_png, read_png_text};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files found for one prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureFiles {
    pub prefix: String,
    pub color: Option<PathBuf>,
    pub depth: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
}

impl CaptureFiles {
    /// All three artifacts present
    pub fn is_complete(&self) -> bool {
        self.color.is_some() && self.depth.is_some() && self.metadata.is_some()
    }

    /// `N` of a `<stem>_<N>` prefix
    pub fn frame_index(&self) -> Option<u64> {
        frame_index(&self.prefix)
    }

    fn set(&mut self, kind: ArtifactKind, path: PathBuf) {
        match kind {
            ArtifactKind::ColorImage => self.color = Some(path),
            ArtifactKind::DepthImage => self.depth = Some(path),
            ArtifactKind::Metadata => self.metadata = Some(path),
        }
    }
}

fn frame_index(prefix: &str) -> Option<u64> {
    prefix.rsplit_once('_')?.1.parse().ok()
}

fn read_error(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Group the artifacts in `folder` by prefix
///
/// Numbered prefixes sort by frame number, then the rest lexically.
/// Files that are not capture artifacts are ignored.
pub fn list_captures(folder: &Path) -> Result<Vec<CaptureFiles>, StorageError> {
    let entries = std::fs::read_dir(folder).map_err(|e| read_error(folder, e))?;

    let mut by_prefix: BTreeMap<String, CaptureFiles> = BTreeMap::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((prefix, kind)) = ArtifactKind::parse_file_name(name) else {
            continue;
        };
        let prefix = prefix.to_string();
        by_prefix
            .entry(prefix.clone())
            .or_insert_with(|| CaptureFiles {
                prefix,
                ..Default::default()
            })
            .set(kind, path);
    }

    let mut captures: Vec<CaptureFiles> = by_prefix.into_values().collect();
    captures.sort_by(|a, b| match (a.frame_index(), b.frame_index()) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.prefix.cmp(&b.prefix)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.prefix.cmp(&b.prefix),
    });

    debug!(folder = %folder.display(), count = captures.len(), "Captures listed");
    Ok(captures)
}

/// Next free `<stem>_<N>` prefix in `folder`, starting at 1
///
/// A folder that does not exist yet has no captures.
pub fn next_prefix(folder: &Path, stem: &str) -> Result<String, StorageError> {
    if !folder.exists() {
        return Ok(format!("{}_1", stem));
    }
    let last = list_captures(folder)?
        .iter()
        .filter_map(|c| {
            let (s, n) = c.prefix.rsplit_once('_')?;
            (s == stem).then(|| n.parse::<u64>().ok()).flatten()
        })
        .max()
        .unwrap_or(0);
    Ok(format!("{}_{}", stem, last + 1))
}

/// Parse a sidecar metadata file
pub fn read_metadata(path: &Path) -> Result<CaptureMetadata, StorageError> {
    let text = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    CaptureMetadata::from_json(&text).map_err(|e| StorageError::InvalidMetadata {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Metadata embedded in a depth PNG, if the writer stored it
pub fn read_embedded_metadata(png_path: &Path) -> Result<Option<CaptureMetadata>, StorageError> {
    let bytes = std::fs::read(png_path).map_err(|e| read_error(png_path, e))?;
    let Some(text) =
        read_png_text(&bytes, PNG_METADATA_KEYWORD).map_err(|e| read_error(png_path, e))?
    else {
        return Ok(None);
    };
    CaptureMetadata::from_json(&text)
        .map(Some)
        .map_err(|e| StorageError::InvalidMetadata {
            path: png_path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Decode a depth PNG written by the capture writer
pub fn read_depth_image(png_path: &Path) -> Result<NormalizedDepthImage, StorageError> {
    let bytes = std::fs::read(png_path).map_err(|e| read_error(png_path, e))?;
    decode_depth_png(&bytes).map_err(|e| read_error(png_path, e))
}

/// Metric depth of a capture, reconstructed from its PNG and metadata
///
/// The sidecar JSON is preferred; the PNG's embedded copy is used when the
/// sidecar is missing.
pub fn load_metric_depth(capture: &CaptureFiles) -> Result<(u32, u32, Vec<f32>), StorageError> {
    let depth_path = capture.depth.as_deref().ok_or_else(|| StorageError::Read {
        path: PathBuf::from(&capture.prefix),
        message: "capture has no depth image".to_string(),
    })?;

    let metadata = match capture.metadata.as_deref() {
        Some(path) => read_metadata(path)?,
        None => read_embedded_metadata(depth_path)?.ok_or_else(|| StorageError::Read {
            path: depth_path.to_path_buf(),
            message: "no metadata available".to_string(),
        })?,
    };

    let range = metadata
        .depth_range()
        .ok_or_else(|| StorageError::InvalidMetadata {
            path: depth_path.to_path_buf(),
            message: "metadata has no usable depth range".to_string(),
        })?;

    let image = read_depth_image(depth_path)?;
    let depth = denormalize_depth(&image, range);
    Ok((image.width, image.height, depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(folder: &Path, name: &str) {
        std::fs::write(folder.join(name), b"x").unwrap();
    }

    #[test]
    fn test_list_groups_by_prefix_in_frame_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "frame_10_colorImage.jpg",
            "frame_10_metadata.json",
            "frame_2_colorImage.jpg",
            "frame_2_depthImage.png",
            "frame_2_metadata.json",
            "notes.txt",
            "custom_colorImage.jpg",
        ] {
            touch(dir.path(), name);
        }

        let captures = list_captures(dir.path()).unwrap();
        let prefixes: Vec<&str> = captures.iter().map(|c| c.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["frame_2", "frame_10", "custom"]);
        assert!(captures[0].is_complete());
        assert!(!captures[1].is_complete());
        assert!(captures[1].depth.is_none());
    }

    #[test]
    fn test_next_prefix() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_prefix(dir.path(), "frame").unwrap(), "frame_1");

        touch(dir.path(), "frame_3_metadata.json");
        touch(dir.path(), "frame_7_colorImage.jpg");
        touch(dir.path(), "shot_40_colorImage.jpg");
        assert_eq!(next_prefix(dir.path(), "frame").unwrap(), "frame_8");
        assert_eq!(next_prefix(dir.path(), "shot").unwrap(), "shot_41");
    }

    #[test]
    fn test_next_prefix_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("Chair");
        assert_eq!(next_prefix(&missing, "frame").unwrap(), "frame_1");
    }

    #[test]
    fn test_list_missing_folder_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            list_captures(&dir.path().join("nope")),
            Err(StorageError::Read { .. })
        ));
    }

    #[test]
    fn test_invalid_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_1_metadata.json");
        std::fs::write(&path, "{\"minDepth\": 1.0}").unwrap();
        assert!(matches!(
            read_metadata(&path),
            Err(StorageError::InvalidMetadata { .. })
        ));
    }
}
