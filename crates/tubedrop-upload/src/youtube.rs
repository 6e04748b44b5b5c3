//! YouTube resumable upload client.

use crate::ResumableUpload;
use crate::error::{Result, UploadError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, LOCATION, RANGE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tubedrop_types::{AccessToken, UploadedVideo, VideoMetadata};

/// YouTube's resumable `videos.insert` endpoint.
pub const UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Chunk sizes must be multiples of this, except for the last chunk.
pub const CHUNK_GRANULARITY: usize = 256 * 1024;

/// Configuration for the upload client.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Upload endpoint.
    pub endpoint: String,
    /// Bytes sent per request.
    pub chunk_size: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: UPLOAD_ENDPOINT.to_string(),
            chunk_size: 32 * CHUNK_GRANULARITY, // 8 MiB
            timeout: Duration::from_secs(300),
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            user_agent: format!("tubedrop/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl UploadConfig {
    /// Calculates the backoff delay with exponential backoff and jitter.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self.base_delay_ms.saturating_mul(1u64 << attempt.min(10));
        let capped_delay = exp_delay.min(self.max_delay_ms);

        // Deterministic jitter (±25%) derived from the attempt number
        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            offset as i64 - jitter_range as i64
        } else {
            0
        };

        Duration::from_millis((capped_delay as i64 + jitter).max(0) as u64)
    }
}

/// Where an upload session stands after a request.
#[derive(Debug)]
enum SessionState {
    /// The server has committed this many bytes.
    Incomplete(u64),
    /// The video resource was created.
    Complete(UploadedVideo),
}

#[derive(Deserialize)]
struct VideoResource {
    id: String,
}

/// Uploads videos through YouTube's resumable upload protocol.
///
/// One retry budget covers opening the session, interrupted requests and
/// `308` answers that commit no new bytes.
#[derive(Debug, Clone)]
pub struct YouTubeUploader {
    client: Client,
    config: UploadConfig,
}

impl YouTubeUploader {
    /// Creates a new uploader with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: UploadConfig) -> Result<Self> {
        let client = Client::builder()
            // 308 means "resume incomplete" here, never a redirect
            .redirect(reqwest::redirect::Policy::none())
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates an uploader with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self> {
        Self::new(UploadConfig::default())
    }

    /// Spends one retry on `error`, sleeping for the backoff delay.
    ///
    /// Fails with [`UploadError::RetriesExhausted`] once `max_retries` have
    /// been used.
    async fn back_off(
        &self,
        retries: &mut u32,
        max_retries: u32,
        error: UploadError,
        offset: u64,
    ) -> Result<()> {
        if *retries >= max_retries {
            return Err(UploadError::RetriesExhausted {
                attempts: *retries,
                source: Box::new(error),
            });
        }
        *retries += 1;
        let delay = self.config.backoff_delay(*retries);
        tracing::warn!(error = %error, retry = *retries, ?delay, offset, "upload interrupted, resuming");
        tokio::time::sleep(delay).await;
        Ok(())
    }

    /// Opens an upload session and returns its URL.
    async fn start_session(
        &self,
        token: &AccessToken,
        metadata: &VideoMetadata,
        total: u64,
    ) -> Result<String> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header(AUTHORIZATION, token.bearer())
            .header("X-Upload-Content-Length", total)
            .header("X-Upload-Content-Type", "video/*")
            .json(&metadata.to_resource())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .ok_or(UploadError::MissingSession)?
            .to_str()
            .map_err(|e| UploadError::Malformed(format!("session URL: {e}")))?;
        Ok(location.to_string())
    }

    /// Sends the chunk starting at `offset`.
    async fn send_chunk(
        &self,
        session: &str,
        token: &AccessToken,
        file: &mut tokio::fs::File,
        path: &Path,
        offset: u64,
        total: u64,
    ) -> Result<SessionState> {
        let len = (total - offset).min(self.config.chunk_size as u64);
        let io_error = |source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut buf = vec![0u8; len as usize];
        file.seek(SeekFrom::Start(offset)).await.map_err(io_error)?;
        file.read_exact(&mut buf).await.map_err(io_error)?;

        let response = self
            .client
            .put(session)
            .header(AUTHORIZATION, token.bearer())
            .header(CONTENT_RANGE, format!("bytes {}-{}/{total}", offset, offset + len - 1))
            .body(Bytes::from(buf))
            .send()
            .await?;

        session_state(response).await
    }

    /// Asks the server how much of the file it already has.
    async fn query_session(
        &self,
        session: &str,
        token: &AccessToken,
        total: u64,
    ) -> Result<SessionState> {
        let response = self
            .client
            .put(session)
            .header(AUTHORIZATION, token.bearer())
            .header(CONTENT_RANGE, format!("bytes */{total}"))
            .body(Bytes::new())
            .send()
            .await?;

        session_state(response).await
    }
}

#[async_trait]
impl ResumableUpload for YouTubeUploader {
    async fn upload(
        &self,
        token: &AccessToken,
        path: &Path,
        metadata: &VideoMetadata,
        max_retries: u32,
        progress: &mut (dyn FnMut(u64) + Send),
    ) -> Result<UploadedVideo> {
        let io_error = |source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let total = file.metadata().await.map_err(io_error)?.len();
        if total == 0 {
            return Err(UploadError::EmptyFile(path.to_path_buf()));
        }

        let mut retries = 0;
        let session = loop {
            match self.start_session(token, metadata, total).await {
                Ok(session) => break session,
                Err(e) if e.is_retryable() => {
                    self.back_off(&mut retries, max_retries, e, 0).await?;
                }
                Err(e) => return Err(e),
            }
        };
        tracing::debug!(file = %path.display(), total, "opened upload session");

        let mut offset = 0;
        let mut resuming = false;

        loop {
            // Once everything is committed only a status query can finish
            // the session.
            let step = if resuming || offset >= total {
                self.query_session(&session, token, total).await
            } else {
                self.send_chunk(&session, token, &mut file, path, offset, total)
                    .await
            };
            let resynced = std::mem::take(&mut resuming);

            let error = match step {
                Ok(SessionState::Complete(video)) => {
                    progress(total);
                    return Ok(video);
                }
                Ok(SessionState::Incomplete(committed)) => {
                    let committed = committed.min(total);
                    // After an interruption the server's offset wins, even
                    // if it went backwards.
                    if resynced || committed > offset {
                        offset = committed;
                        progress(offset);
                        continue;
                    }
                    UploadError::Malformed(format!(
                        "server committed no bytes past {offset} of {total}"
                    ))
                }
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            self.back_off(&mut retries, max_retries, error, offset).await?;
            resuming = true;
        }
    }
}

/// Interprets a response to a chunk or status query.
async fn session_state(response: Response) -> Result<SessionState> {
    match response.status() {
        StatusCode::OK | StatusCode::CREATED => {
            let video: VideoResource = response.json().await?;
            Ok(SessionState::Complete(UploadedVideo { id: video.id }))
        }
        StatusCode::PERMANENT_REDIRECT => {
            let committed = match response.headers().get(RANGE) {
                Some(range) => {
                    let range = range
                        .to_str()
                        .map_err(|e| UploadError::Malformed(format!("Range header: {e}")))?;
                    committed_bytes(range)?
                }
                None => 0,
            };
            Ok(SessionState::Incomplete(committed))
        }
        _ => Err(status_error(response).await),
    }
}

/// Parses a `Range: bytes=0-N` header into the number of committed bytes.
fn committed_bytes(range: &str) -> Result<u64> {
    range
        .strip_prefix("bytes=")
        .and_then(|r| r.split_once('-'))
        .and_then(|(_, end)| end.trim().parse::<u64>().ok())
        .map(|end| end + 1)
        .ok_or_else(|| UploadError::Malformed(format!("Range header: {range:?}")))
}

async fn status_error(response: Response) -> UploadError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    UploadError::Status { status, message }
}
