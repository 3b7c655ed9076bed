//! dirmirror Sync - One-way directory reconciliation
//!
//! Provides:
//! - Recursive per-level reconciliation of a Target tree against a Source tree
//! - Byte-exact content comparison and atomic file replacement
//! - A timer-driven scheduler with cooperative shutdown
//!
//! ## Modules
//!
//! - [`engine`] - The [`Reconciler`](engine::Reconciler) and its ordering rules
//! - [`filesystem`] - Local filesystem adapter (atomic copies, streamed compare)
//! - [`scheduler`] - Repeats passes on a fixed interval until cancelled

pub mod engine;
pub mod filesystem;
pub mod scheduler;

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// The Source directory did not exist when it was visited
    #[error("Source folder does not exist: {0}")]
    SourceMissing(PathBuf),

    /// The Target root exists but is a file or other non-directory
    #[error("Target exists but is not a directory: {0}")]
    TargetNotDirectory(PathBuf),

    /// A path expected to be a directory is something else
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Insufficient filesystem permissions
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// No available disk space to complete the operation
    #[error("Disk full while writing {0}")]
    DiskFull(PathBuf),

    /// The specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Any other I/O error, with the path it happened at
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Classifies an I/O error raised while operating on `path`
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();

        #[cfg(unix)]
        if err.raw_os_error() == Some(libc::ENOSPC) {
            return SyncError::DiskFull(path);
        }

        match err.kind() {
            ErrorKind::PermissionDenied => SyncError::PermissionDenied(path),
            ErrorKind::NotFound => SyncError::PathNotFound(path),
            _ => SyncError::Io { path, source: err },
        }
    }
}
