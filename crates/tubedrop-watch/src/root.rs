//! The watch root and its state directories.

use crate::error::{Result, Transition, WatchError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tubedrop_types::StateDir;

/// Extension recognized as a finished video.
pub const VIDEO_EXTENSION: &str = "mp4";

/// A watched directory whose subdirectories encode file state.
///
/// Files are tracked by bare filename only; the directory a file sits in is
/// its state. Transitions are single `rename` calls, so a file is never
/// present in two states at once.
#[derive(Debug, Clone)]
pub struct WatchRoot {
    path: PathBuf,
}

impl WatchRoot {
    /// Creates a handle for the given directory. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the watch root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the full path of `name` in `state`.
    #[must_use]
    pub fn file_path(&self, state: StateDir, name: &str) -> PathBuf {
        state.path_in(&self.path).join(name)
    }

    /// Returns true if `name` currently resides in `state`.
    #[must_use]
    pub fn contains(&self, state: StateDir, name: &str) -> bool {
        self.file_path(state, name).exists()
    }

    /// Creates the `queue`, `inprogress`, `done` and `failed` subdirectories.
    ///
    /// Existing directories are left alone. Any other failure is logged and
    /// ignored; a missing or unwritable root surfaces in the following scan
    /// or move.
    pub fn bootstrap(&self) {
        for state in StateDir::PROVISIONED {
            let dir = state.path_in(&self.path);
            match fs::create_dir(&dir) {
                Ok(()) => tracing::debug!(path = %dir.display(), "created state directory"),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "could not create state directory");
                }
            }
        }
    }

    /// Finds the first video file directly under the watch root.
    ///
    /// Entries are inspected in directory-listing order. A match is an entry
    /// whose name ends in `mp4` (any case) and whose metadata says it is a
    /// regular file. Returns the bare filename.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Empty`] if the root has no entries,
    /// [`WatchError::NoMatch`] if the whole listing was consumed without a
    /// match, and [`WatchError::ReadDir`] if the root cannot be listed.
    pub fn scan(&self) -> Result<String> {
        let read_dir_error = |source| WatchError::ReadDir {
            path: self.path.clone(),
            source,
        };
        let entries = fs::read_dir(&self.path).map_err(read_dir_error)?;

        let mut scanned = 0;
        for entry in entries {
            let entry = entry.map_err(read_dir_error)?;
            scanned += 1;

            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!(entry = ?entry.file_name(), "skipping non-UTF-8 name");
                continue;
            };
            if !is_video_name(&name) {
                continue;
            }

            // fs::metadata follows symlinks, like stat
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => {
                    tracing::debug!(file = %name, scanned, "found video file");
                    return Ok(name);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(file = %name, error = %e, "skipping unreadable entry"),
            }
        }

        if scanned == 0 {
            Err(WatchError::Empty)
        } else {
            Err(WatchError::NoMatch { scanned })
        }
    }

    /// Renames `name` from one state directory to another.
    ///
    /// Returns the new full path. On failure the file stays where it was.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidName`] if `name` is not a bare filename
    /// and [`WatchError::Move`] if the rename fails.
    pub fn move_file(&self, name: &str, from: StateDir, to: StateDir) -> Result<PathBuf> {
        validate_name(name)?;

        let source = self.file_path(from, name);
        let target = self.file_path(to, name);
        let transition = Transition { from, to };

        match fs::rename(&source, &target) {
            Ok(()) => {
                tracing::debug!(file = %name, %transition, "moved file");
                Ok(target)
            }
            Err(e) => {
                tracing::error!(
                    from = %source.display(),
                    to = %target.display(),
                    error = %e,
                    "Could not rename"
                );
                Err(WatchError::Move {
                    from: source,
                    to: target,
                    source: e,
                })
            }
        }
    }

    /// Claims a newly dropped file by moving it from the root into `queue`.
    ///
    /// # Errors
    ///
    /// See [`WatchRoot::move_file`].
    pub fn enqueue(&self, name: &str) -> Result<PathBuf> {
        self.move_file(name, StateDir::Root, StateDir::Queue)
    }
}

/// Returns true if the last three characters of `name` are `mp4`, ignoring case.
#[must_use]
pub fn is_video_name(name: &str) -> bool {
    name.len()
        .checked_sub(VIDEO_EXTENSION.len())
        .and_then(|start| name.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(VIDEO_EXTENSION))
}

fn validate_name(name: &str) -> Result<()> {
    let bare = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name);

    if bare {
        Ok(())
    } else {
        Err(WatchError::InvalidName(name.to_string()))
    }
}
