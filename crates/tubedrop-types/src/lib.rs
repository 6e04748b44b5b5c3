//! Core types for the tubedrop watch-folder uploader.
//!
//! This crate provides the data structures shared by every stage of a run:
//!
//! - [`StateDir`] - Lifecycle state encoded as a directory name
//! - [`Credentials`] - OAuth client credentials
//! - [`AccessToken`] - Bearer token used for one upload
//! - [`VideoMetadata`] - Title, description, category and privacy of a video
//! - [`UploadedVideo`] - Identifier of a video accepted by YouTube

#![doc(issue_tracker_base_url = "https://github.com/tubedrop/tubedrop/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod credentials;
mod metadata;
mod state;

pub use credentials::{AccessToken, Credentials};
pub use metadata::{
    DEFAULT_CATEGORY_ID, Privacy, PrivacyParseError, UploadedVideo, VideoMetadata,
};
pub use state::StateDir;
