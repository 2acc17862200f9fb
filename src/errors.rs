// SPDX-License-Identifier: GPL-3.0-only

//! Error types for depth normalization and capture storage

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Depth processing errors
    #[error("Depth error: {0}")]
    Depth(#[from] DepthError),
    /// Capture storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// File access outside of a capture write
    #[error("I/O error: {0}")]
    Io(String),
}

/// Depth buffer and normalization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepthError {
    /// No finite samples, or all finite samples share one value
    #[error("no usable depth range in buffer")]
    EmptyRange,
    /// Width or height is zero, or the stride is narrower than a row
    #[error("invalid depth dimensions {width}x{height} (stride {stride})")]
    InvalidDimensions { width: u32, height: u32, stride: usize },
    /// Sample slice does not cover the declared dimensions
    #[error("depth buffer holds {actual} samples, expected at least {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
    /// The platform buffer refused to lock
    #[error("failed to lock depth buffer: {0}")]
    LockFailed(String),
}

/// Failure of one capture artifact; reported, never fatal to siblings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    /// The artifact could not be serialized
    #[error("encoding failed: {0}")]
    Encode(String),
    /// The artifact could not be written to disk
    #[error("write failed: {0}")]
    Io(String),
    /// The background task producing the artifact did not finish
    #[error("task failed: {0}")]
    Task(String),
}

/// Filesystem errors that abort a whole capture
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The object folder could not be created
    #[error("failed to create folder {}: {message}", .path.display())]
    CreateFolder { path: PathBuf, message: String },
    /// The device ran out of space while writing
    #[error("disk full while writing {}", .path.display())]
    DiskFull { path: PathBuf },
    /// A capture folder could not be listed or a file could not be read
    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },
    /// The prefix is empty or would escape the object folder
    #[error("invalid capture prefix {0:?}")]
    InvalidPrefix(String),
    /// A metadata document did not match the expected schema
    #[error("invalid metadata in {}: {message}", .path.display())]
    InvalidMetadata { path: PathBuf, message: String },
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<std::io::Error> for ArtifactError {
    fn from(err: std::io::Error) -> Self {
        ArtifactError::Io(err.to_string())
    }
}

impl From<image::ImageError> for ArtifactError {
    fn from(err: image::ImageError) -> Self {
        ArtifactError::Encode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_error_converts_to_app_error() {
        let err: AppError = DepthError::EmptyRange.into();
        assert!(matches!(err, AppError::Depth(DepthError::EmptyRange)));
        assert_eq!(err.to_string(), "Depth error: no usable depth range in buffer");
    }

    #[test]
    fn test_io_error_converts_to_app_error() {
        let err: AppError = std::io::Error::other("read-only").into();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_storage_error_mentions_path() {
        let err = StorageError::CreateFolder {
            path: PathBuf::from("/tmp/Chair"),
            message: "permission denied".into(),
        };
        assert!(err.to_string().contains("/tmp/Chair"));
    }
}
