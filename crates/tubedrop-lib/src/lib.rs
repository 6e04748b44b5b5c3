//! Watch a folder and upload finished videos to YouTube.
//!
//! This is a facade crate that re-exports functionality from the tubedrop
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use tubedrop_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = WatchRoot::new("watchfolder");
//!     root.bootstrap();
//!
//!     let credentials = load_credentials("credentials.json".as_ref()).await?;
//!     let name = root.scan()?;
//!     root.enqueue(&name)?;
//!
//!     let token = InstalledFlow::new()?
//!         .authorize(&credentials, &[YOUTUBE_UPLOAD_SCOPE])
//!         .await?;
//!
//!     let driver = UploadDriver::new(root, YouTubeUploader::with_defaults()?);
//!     let report = driver.run(&token, &name).await?;
//!     println!("Uploaded {}", report.video.watch_url());
//!
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/tubedrop/tubedrop/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use tubedrop_types::*;

// Re-export watch-folder handling
pub use tubedrop_watch::{VIDEO_EXTENSION, Transition, WatchError, WatchRoot, is_video_name};

// Re-export authorization
#[cfg(feature = "auth")]
pub use tubedrop_auth::{
    AuthError, Authorizer, InstalledFlow, YOUTUBE_UPLOAD_SCOPE, load_credentials,
    parse_credentials,
};

// Re-export uploads
#[cfg(feature = "upload")]
pub use tubedrop_upload::{
    DEFAULT_MAX_RETRIES, DriverError, ResumableUpload, UploadConfig, UploadDriver, UploadError,
    UploadOptions, UploadReport, YouTubeUploader,
};

/// Prelude module for convenient imports.
///
/// ```
/// use tubedrop_lib::prelude::*;
/// ```
pub mod prelude {
    pub use tubedrop_types::{
        AccessToken, Credentials, Privacy, StateDir, UploadedVideo, VideoMetadata,
    };

    pub use tubedrop_watch::{WatchError, WatchRoot};

    #[cfg(feature = "auth")]
    pub use tubedrop_auth::{
        AuthError, Authorizer, InstalledFlow, YOUTUBE_UPLOAD_SCOPE, load_credentials,
    };

    #[cfg(feature = "upload")]
    pub use tubedrop_upload::{
        DriverError, ResumableUpload, UploadDriver, UploadError, UploadOptions, UploadReport,
        YouTubeUploader,
    };
}
