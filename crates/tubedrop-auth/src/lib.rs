//! Credential loading and OAuth token acquisition for the tubedrop uploader.
//!
//! - [`load_credentials`] - Reads the client credentials file
//! - [`Authorizer`] - Exchanges credentials for an [`AccessToken`]
//! - [`InstalledFlow`] - Browser consent with a loopback redirect

#![doc(issue_tracker_base_url = "https://github.com/tubedrop/tubedrop/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod credentials;
mod error;
mod flow;

use async_trait::async_trait;
use tubedrop_types::{AccessToken, Credentials};

pub use credentials::{load_credentials, parse_credentials};
pub use error::{AuthError, Result};
pub use flow::{ConsentPrompt, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, InstalledFlow};

/// Scope allowing uploads to the authorized channel.
pub const YOUTUBE_UPLOAD_SCOPE: &str = "https://www.googleapis.com/auth/youtube.upload";

/// Exchanges client credentials for an access token.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Runs the authorization flow for the given scopes.
    ///
    /// # Errors
    ///
    /// Returns an error if the flow fails or consent is refused.
    async fn authorize(&self, credentials: &Credentials, scopes: &[&str]) -> Result<AccessToken>;
}
