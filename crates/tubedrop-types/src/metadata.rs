//! Video metadata sent with an upload.

use std::str::FromStr;

/// Default YouTube category ("People & Blogs").
pub const DEFAULT_CATEGORY_ID: u32 = 22;

/// Visibility of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Privacy {
    /// Only visible to the channel owner.
    #[default]
    Private,
    /// Visible to anyone with the link.
    Unlisted,
    /// Listed publicly.
    Public,
}

impl Privacy {
    /// Returns the privacy status as sent to the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Unlisted => "unlisted",
            Self::Public => "public",
        }
    }
}

impl std::fmt::Display for Privacy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = PrivacyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            "public" => Ok(Self::Public),
            _ => Err(PrivacyParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown privacy status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyParseError(String);

impl std::fmt::Display for PrivacyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid privacy '{}', expected one of: private, unlisted, public",
            self.0
        )
    }
}

impl std::error::Error for PrivacyParseError {}

/// Metadata attached to an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    /// YouTube category id.
    pub category_id: u32,
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: String,
    /// Visibility after upload.
    pub privacy: Privacy,
}

impl VideoMetadata {
    /// Metadata for a file: titled after the file, empty description,
    /// default category, private.
    #[must_use]
    pub fn for_file(filename: impl Into<String>) -> Self {
        Self {
            category_id: DEFAULT_CATEGORY_ID,
            title: filename.into(),
            description: String::new(),
            privacy: Privacy::Private,
        }
    }

    /// Overrides the privacy status.
    #[must_use]
    pub const fn with_privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = privacy;
        self
    }

    /// Overrides the category id.
    #[must_use]
    pub const fn with_category(mut self, category_id: u32) -> Self {
        self.category_id = category_id;
        self
    }

    /// Builds the `videos` resource body for the insert request.
    #[must_use]
    pub fn to_resource(&self) -> serde_json::Value {
        serde_json::json!({
            "snippet": {
                "categoryId": self.category_id.to_string(),
                "title": self.title,
                "description": self.description,
            },
            "status": {
                "privacyStatus": self.privacy.as_str(),
            },
        })
    }
}

/// A video accepted by YouTube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVideo {
    /// The YouTube video id.
    pub id: String,
}

impl UploadedVideo {
    /// Returns the watch URL for this video.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata() {
        let metadata = VideoMetadata::for_file("clip.mp4");
        assert_eq!(metadata.category_id, 22);
        assert_eq!(metadata.title, "clip.mp4");
        assert!(metadata.description.is_empty());
        assert_eq!(metadata.privacy, Privacy::Private);
    }

    #[test]
    fn test_resource_shape() {
        let resource = VideoMetadata::for_file("clip.mp4").to_resource();
        assert_eq!(resource["snippet"]["categoryId"], "22");
        assert_eq!(resource["snippet"]["title"], "clip.mp4");
        assert_eq!(resource["snippet"]["description"], "");
        assert_eq!(resource["status"]["privacyStatus"], "private");
    }

    #[test]
    fn test_privacy_parse() {
        assert_eq!("Unlisted".parse::<Privacy>().unwrap(), Privacy::Unlisted);
        assert!("secret".parse::<Privacy>().is_err());
    }

    #[test]
    fn test_watch_url() {
        let video = UploadedVideo {
            id: "dQw4w9WgXcQ".to_string(),
        };
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
