//! Error types for watch-folder operations.

use std::path::PathBuf;
use thiserror::Error;
use tubedrop_types::StateDir;

/// Errors that can occur while scanning or moving files.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Failed to list the watch root.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        /// The directory that could not be listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The watch root has no entries at all.
    #[error("no files")]
    Empty,

    /// The watch root has entries but none is a video file.
    #[error("no video file among {scanned} entries")]
    NoMatch {
        /// Number of entries inspected.
        scanned: usize,
    },

    /// The filename would escape its state directory.
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    /// Renaming between state directories failed.
    #[error("Could not rename '{}' to '{}': {source}", from.display(), to.display())]
    Move {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl WatchError {
    /// Returns true when the scan simply found nothing to do.
    #[must_use]
    pub const fn is_no_files(&self) -> bool {
        matches!(self, Self::Empty | Self::NoMatch { .. })
    }
}

/// Result type for watch-folder operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// A transition between two states, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State the file leaves.
    pub from: StateDir,
    /// State the file enters.
    pub to: StateDir,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
