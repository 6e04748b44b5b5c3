//! Drives one file from `queue` through an upload to `done` or `failed`.

use crate::ResumableUpload;
use crate::error::{DriverError, UploadError};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tubedrop_types::{AccessToken, DEFAULT_CATEGORY_ID, Privacy, StateDir, UploadedVideo, VideoMetadata};
use tubedrop_watch::WatchRoot;

/// Retries granted to the upload client.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Settings applied to every upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Visibility of the uploaded video.
    pub privacy: Privacy,
    /// YouTube category id.
    pub category_id: u32,
    /// Retries the upload client may spend.
    pub max_retries: u32,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            privacy: Privacy::Private,
            category_id: DEFAULT_CATEGORY_ID,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// A completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// The video created on YouTube.
    pub video: UploadedVideo,
    /// Where the file now lives (under `done`).
    pub path: PathBuf,
    /// Size of the uploaded file in bytes.
    pub bytes: u64,
}

/// Runs an upload for a queued file and performs both terminal moves.
///
/// The file is moved `queue -> inprogress` before the first byte is sent, so
/// a crashed run leaves it visible in `inprogress`. Afterwards it lands in
/// `done` or `failed`.
#[derive(Debug)]
pub struct UploadDriver<U> {
    root: WatchRoot,
    uploader: U,
    progress: ProgressBar,
    options: UploadOptions,
}

impl<U: ResumableUpload> UploadDriver<U> {
    /// Creates a driver with a hidden progress bar and default options.
    #[must_use]
    pub fn new(root: WatchRoot, uploader: U) -> Self {
        Self {
            root,
            uploader,
            progress: ProgressBar::hidden(),
            options: UploadOptions::default(),
        }
    }

    /// Reports progress on the given bar.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Overrides the upload options.
    #[must_use]
    pub const fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the wrapped uploader.
    #[must_use]
    pub const fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Uploads the queued file `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Watch`] if the file cannot be claimed from
    /// `queue`, [`DriverError::Upload`] if the upload fails (the file is then
    /// in `failed`), [`DriverError::Finalize`] if the move to `done` fails and
    /// [`DriverError::Stranded`] if both the upload and the move to `failed`
    /// fail.
    pub async fn run(&self, token: &AccessToken, name: &str) -> Result<UploadReport, DriverError> {
        let path = self
            .root
            .move_file(name, StateDir::Queue, StateDir::InProgress)?;

        match self.upload(token, name, &path).await {
            Ok((video, total)) => {
                self.progress
                    .finish_with_message(format!("{name} uploaded as {}", video.id));
                tracing::info!(file = %path.display(), video_id = %video.id, "successful upload");
                let done = self
                    .root
                    .move_file(name, StateDir::InProgress, StateDir::Done)
                    .map_err(DriverError::Finalize)?;
                Ok(UploadReport {
                    video,
                    path: done,
                    bytes: total,
                })
            }
            Err(e) => {
                self.progress.abandon_with_message(format!("{name} failed"));
                tracing::error!(file = %path.display(), error = %e, "error during upload");
                match self.root.move_file(name, StateDir::InProgress, StateDir::Failed) {
                    Ok(_) => Err(DriverError::Upload(e)),
                    Err(moved) => Err(DriverError::Stranded { upload: e, moved }),
                }
            }
        }
    }

    /// Uploads the file at `path` (in `inprogress`) and returns the video
    /// with the file size.
    async fn upload(
        &self,
        token: &AccessToken,
        name: &str,
        path: &Path,
    ) -> Result<(UploadedVideo, u64), UploadError> {
        let total = tokio::fs::metadata(path)
            .await
            .map_err(|source| UploadError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let metadata = VideoMetadata::for_file(name)
            .with_privacy(self.options.privacy)
            .with_category(self.options.category_id);

        self.progress.set_length(total);
        self.progress.set_position(0);
        self.progress.set_message(name.to_string());

        let bar = self.progress.clone();
        let mut on_progress = move |bytes: u64| {
            tracing::debug!(progress = bytes, total, "Upload in progress");
            bar.set_position(bytes);
        };

        tracing::info!(file = %path.display(), total, privacy = %metadata.privacy, "starting upload");
        let video = self
            .uploader
            .upload(
                token,
                path,
                &metadata,
                self.options.max_retries,
                &mut on_progress,
            )
            .await?;
        Ok((video, total))
    }
}
