//! Loading OAuth client credentials from disk.

use crate::error::{AuthError, Result};
use serde::Deserialize;
use std::path::Path;
use tubedrop_types::Credentials;

/// Name used when a Google client-secret file carries no project id.
const FALLBACK_NAME: &str = "tubedrop";

/// Accepted on-disk layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Flat(Credentials),
    Installed { installed: ClientSecret },
    Web { web: ClientSecret },
}

/// The object nested in a client-secret file downloaded from the Google console.
#[derive(Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    project_id: Option<String>,
}

impl From<CredentialsFile> for Credentials {
    fn from(file: CredentialsFile) -> Self {
        match file {
            CredentialsFile::Flat(credentials) => credentials,
            CredentialsFile::Installed { installed: secret }
            | CredentialsFile::Web { web: secret } => Self::new(
                secret.project_id.unwrap_or_else(|| FALLBACK_NAME.to_string()),
                secret.client_id,
                secret.client_secret,
            ),
        }
    }
}

/// Parses a credentials document.
///
/// Accepts `{"name", "client_id", "client_secret"}` as well as the
/// `{"installed": {...}}` and `{"web": {...}}` files from the Google console.
///
/// # Errors
///
/// Returns the JSON error if the document matches neither layout.
pub fn parse_credentials(json: &str) -> serde_json::Result<Credentials> {
    serde_json::from_str::<CredentialsFile>(json).map(Credentials::from)
}

/// Reads and parses the credentials file at `path`.
///
/// # Errors
///
/// Returns [`AuthError::ReadCredentials`] if the file cannot be read and
/// [`AuthError::ParseCredentials`] if it cannot be parsed.
pub async fn load_credentials(path: &Path) -> Result<Credentials> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Cannot read credentials");
        AuthError::ReadCredentials {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    let credentials = parse_credentials(&content).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Cannot parse credentials");
        AuthError::ParseCredentials {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    tracing::debug!(name = %credentials.name, client_id = %credentials.client_id, "loaded credentials");
    Ok(credentials)
}
