// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for capture folders

use crate::constants::{DEFAULT_OBJECT_LABEL, DEFAULT_SAVE_FOLDER};
use crate::pipelines::capture::{CaptureFiles, list_captures};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Default root holding one folder per captured object
pub fn default_output_root() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}

/// Turn a user-supplied object label into a single folder name
///
/// Path separators and control characters become `_`. A blank label, or
/// one made only of dots, falls back to `default`, which is cleaned the same
/// way and replaced by [`DEFAULT_OBJECT_LABEL`] when unusable too.
pub fn sanitize_label(label: &str, default: &str) -> String {
    clean_label(label)
        .or_else(|| clean_label(default))
        .unwrap_or_else(|| DEFAULT_OBJECT_LABEL.to_string())
}

fn clean_label(label: &str) -> Option<String> {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

/// `<root>/<sanitized label>`
pub fn object_folder(root: &Path, label: &str, default_label: &str) -> PathBuf {
    root.join(sanitize_label(label, default_label))
}

/// Find the most recently written capture in `folder`
///
/// Scans on a blocking task and compares the newest modification time of
/// each capture's files.
pub async fn load_latest_capture(folder: PathBuf) -> Option<CaptureFiles> {
    let captures = tokio::task::spawn_blocking(move || list_captures(&folder).ok())
        .await
        .ok()??;

    let modified = |path: &Option<PathBuf>| -> Option<SystemTime> {
        std::fs::metadata(path.as_ref()?).ok()?.modified().ok()
    };

    let latest = captures.into_iter().max_by_key(|c| {
        [&c.color, &c.depth, &c.metadata]
            .into_iter()
            .filter_map(modified)
            .max()
    })?;

    debug!(prefix = %latest.prefix, "Latest capture found");
    Some(latest)
}
