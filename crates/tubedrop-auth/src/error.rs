//! Error types for credential loading and authorization.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading credentials or acquiring a token.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Failed to read the credentials file.
    #[error("Cannot read credentials '{path}': {source}")]
    ReadCredentials {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The credentials file is not valid JSON of the expected shape.
    #[error("Cannot parse credentials '{path}': {source}")]
    ParseCredentials {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Could not open the local redirect listener.
    #[error("Failed to listen for the OAuth redirect: {0}")]
    Listen(#[source] std::io::Error),

    /// The redirect request could not be read or understood.
    #[error("Invalid OAuth redirect: {0}")]
    Callback(String),

    /// The user or the server refused consent.
    #[error("Authorization denied: {0}")]
    Denied(String),

    /// The token endpoint rejected the authorization code.
    #[error("Token exchange failed ({status}): {message}")]
    Exchange {
        /// HTTP status code.
        status: u16,
        /// Error reported by the server.
        message: String,
    },

    /// An endpoint URL could not be parsed.
    #[error("Invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthError>;
