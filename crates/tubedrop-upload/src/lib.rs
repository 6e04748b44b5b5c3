//! Resumable YouTube upload and upload driver for the tubedrop uploader.
//!
//! - [`ResumableUpload`] - Narrow interface to a resumable upload client
//! - [`YouTubeUploader`] - Chunked uploads against the YouTube Data API
//! - [`UploadDriver`] - Moves a queued file through an upload to `done` or `failed`

#![doc(issue_tracker_base_url = "https://github.com/tubedrop/tubedrop/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod driver;
mod error;
#[cfg(test)]
mod testing;
mod youtube;

use async_trait::async_trait;
use std::path::Path;
use tubedrop_types::{AccessToken, UploadedVideo, VideoMetadata};

pub use driver::{DEFAULT_MAX_RETRIES, UploadDriver, UploadOptions, UploadReport};
pub use error::{DriverError, Result, UploadError};
pub use youtube::{CHUNK_GRANULARITY, UPLOAD_ENDPOINT, UploadConfig, YouTubeUploader};

/// A client that uploads a file in resumable chunks.
///
/// Implementations call `progress` with the number of bytes the server has
/// committed, zero or more times, and then return exactly one outcome.
#[async_trait]
pub trait ResumableUpload: Send + Sync {
    /// Uploads the file at `path`, resuming up to `max_retries` times after
    /// transient failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload cannot be completed.
    async fn upload(
        &self,
        token: &AccessToken,
        path: &Path,
        metadata: &VideoMetadata,
        max_retries: u32,
        progress: &mut (dyn FnMut(u64) + Send),
    ) -> Result<UploadedVideo>;
}
