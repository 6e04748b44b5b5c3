//! Lifecycle state directories.

use std::path::{Path, PathBuf};

/// Position of a tracked file in its lifecycle.
///
/// The directory a file physically resides in *is* its state; there is no
/// separate metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateDir {
    /// The watch root itself, where new files are dropped.
    Root,
    /// Claimed by this process, waiting for authorization.
    Queue,
    /// Upload in flight.
    InProgress,
    /// Uploaded successfully.
    Done,
    /// Upload failed.
    Failed,
}

impl StateDir {
    /// The subdirectories provisioned under every watch root.
    pub const PROVISIONED: [Self; 4] = [Self::Queue, Self::InProgress, Self::Done, Self::Failed];

    /// Returns the directory name relative to the watch root.
    ///
    /// The root state maps to `.`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Root => ".",
            Self::Queue => "queue",
            Self::InProgress => "inprogress",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Resolves this state's directory under `root`.
    #[must_use]
    pub fn path_in(&self, root: &Path) -> PathBuf {
        match self {
            Self::Root => root.to_path_buf(),
            other => root.join(other.as_str()),
        }
    }
}

impl std::fmt::Display for StateDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioned_excludes_root() {
        assert_eq!(StateDir::PROVISIONED.len(), 4);
        assert!(!StateDir::PROVISIONED.contains(&StateDir::Root));
    }

    #[test]
    fn test_path_in() {
        let root = Path::new("/srv/watch");
        assert_eq!(StateDir::Root.path_in(root), PathBuf::from("/srv/watch"));
        assert_eq!(
            StateDir::InProgress.path_in(root),
            PathBuf::from("/srv/watch/inprogress")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(StateDir::Root.to_string(), "root");
        assert_eq!(StateDir::InProgress.to_string(), "inprogress");
    }
}
