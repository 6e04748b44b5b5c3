//! Watch-folder state directories for the tubedrop uploader.
//!
//! - [`WatchRoot::bootstrap`] - Provisions the state subdirectories
//! - [`WatchRoot::scan`] - Picks the first finished video in the watch root
//! - [`WatchRoot::move_file`] - Atomic rename between two states

#![doc(issue_tracker_base_url = "https://github.com/tubedrop/tubedrop/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod root;

pub use error::{Result, Transition, WatchError};
pub use root::{VIDEO_EXTENSION, WatchRoot, is_video_name};
