// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_OBJECT_LABEL, DEFAULT_PREFIX_STEM,
};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::EncodingQuality;
use crate::storage::default_output_root;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// User configuration, stored as JSON in the platform config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root folder holding one folder per captured object
    pub output_root: PathBuf,
    /// Object folder used when no label is given
    pub default_object_label: String,
    /// JPEG quality of the color photograph
    pub color_quality: EncodingQuality,
    /// Store the metadata document inside the depth PNG as well
    pub embed_metadata_in_png: bool,
    /// Stem of generated capture prefixes
    pub prefix_stem: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            default_object_label: DEFAULT_OBJECT_LABEL.to_string(),
            color_quality: EncodingQuality::default(),
            embed_metadata_in_png: true,
            prefix_stem: DEFAULT_PREFIX_STEM.to_string(),
        }
    }
}

impl Config {
    /// `<config_dir>/depth-capture/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config = serde_json::from_str(&text).map_err(|e| {
                    AppError::Config(format!("{}: {}", path.display(), e))
                })?;
                debug!(path = %path.display(), "Configuration loaded");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Config(format!("{}: {}", path.display(), e))),
        }
    }

    /// Load from the default location
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Write pretty-printed JSON to `path`, creating parent folders
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}
