//! Error types for uploads.

use std::path::PathBuf;
use thiserror::Error;
use tubedrop_watch::WatchError;

/// Errors reported by a resumable upload.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Failed to read the video file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file being uploaded.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The video file has no content.
    #[error("Refusing to upload empty file '{0}'")]
    EmptyFile(PathBuf),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an unexpected status.
    #[error("Server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The session request succeeded but carried no upload URL.
    #[error("Upload session response has no Location header")]
    MissingSession,

    /// The server answered with something that could not be interpreted.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Gave up after the retry budget was spent.
    #[error("Upload failed after {attempts} retries: {source}")]
    RetriesExhausted {
        /// Number of retries performed.
        attempts: u32,
        /// The last error.
        source: Box<UploadError>,
    },
}

impl UploadError {
    /// Returns true for failures worth resuming after: transport errors,
    /// server errors and rate limiting.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                !e.is_builder() && (e.is_timeout() || e.is_connect() || e.is_request() || e.is_body())
            }
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Errors from a full driver run.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The file could not be moved into `inprogress`.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// The upload failed; the file was moved to `failed`.
    #[error("error during upload: {0}")]
    Upload(#[source] UploadError),

    /// The upload succeeded but the file could not be moved to `done`.
    #[error("Could not finalize upload: {0}")]
    Finalize(#[source] WatchError),

    /// The upload failed and the file could not be moved to `failed` either;
    /// it stays in `inprogress`.
    #[error("error during upload: {upload} (file left in inprogress: {moved})")]
    Stranded {
        /// Why the upload failed.
        #[source]
        upload: UploadError,
        /// Why the move to `failed` failed.
        moved: WatchError,
    },
}

impl DriverError {
    /// Returns the upload error, if the run got as far as uploading.
    #[must_use]
    pub const fn upload_error(&self) -> Option<&UploadError> {
        match self {
            Self::Upload(e) | Self::Stranded { upload: e, .. } => Some(e),
            Self::Watch(_) | Self::Finalize(_) => None,
        }
    }
}

/// Result type for upload operations.
pub type Result<T> = std::result::Result<T, UploadError>;
