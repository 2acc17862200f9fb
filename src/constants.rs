// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// File name suffix of the color photograph of a capture
pub const COLOR_IMAGE_SUFFIX: &str = "_colorImage.jpg";

/// File name suffix of the normalized depth image of a capture
pub const DEPTH_IMAGE_SUFFIX: &str = "_depthImage.png";

/// File name suffix of the metadata sidecar of a capture
pub const METADATA_SUFFIX: &str = "_metadata.json";

/// PNG text chunk keyword holding the embedded metadata document
pub const PNG_METADATA_KEYWORD: &str = "Description";

/// Largest value of a normalized depth sample
pub const DEPTH_GRAY_MAX: f64 = 255.0;

/// Folder created under the pictures directory when no output root is configured
pub const DEFAULT_SAVE_FOLDER: &str = "DepthCapture";

/// Object folder name used when the user gives no label
pub const DEFAULT_OBJECT_LABEL: &str = "Object";

/// Stem of generated capture prefixes (`frame_1`, `frame_2`, ...)
pub const DEFAULT_PREFIX_STEM: &str = "frame";

/// Application directory under the platform config directory
pub const CONFIG_DIR_NAME: &str = "depth-capture";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";
