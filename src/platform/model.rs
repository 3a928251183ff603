use std::{
    fmt::{self, Display},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::service::Cacheable;

use super::PlatformError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Ord, PartialOrd)]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum Platform {
    TikTok,
    Twitter,
    Instagram,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 4] = [Platform::TikTok, Platform::Twitter, Platform::Instagram, Platform::YouTube];

    pub fn key(&self) -> &'static str {
        match self {
            Self::TikTok => "tiktok",
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::YouTube => "youtube",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TikTok => "TikTok",
            Self::Twitter => "Twitter",
            Self::Instagram => "Instagram",
            Self::YouTube => "YouTube",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiktok" => Ok(Self::TikTok),
            "twitter" | "x" => Ok(Self::Twitter),
            "instagram" => Ok(Self::Instagram),
            "youtube" | "youtube short" => Ok(Self::YouTube),
            _ => Err(PlatformError::InvalidPlatform(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, Ord, PartialEq, PartialOrd)]
pub enum MediaContentType {
    Single,
    Multiple,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, Ord, PartialEq, PartialOrd)]
pub struct MediaAuthor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub username: String,
}

// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct MediaFile {
    pub id: String,
    pub platform: Platform,
    /// Canonical link to the post on its platform.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<MediaAuthor>,
    pub content_type: MediaContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Url>,
    pub items: Vec<MediaFileItem>,
}

impl MediaFile {
    pub fn new(platform: Platform, id: impl Into<String>, source: impl Into<String>, items: Vec<MediaFileItem>) -> Self {
        let content_type = if items.len() > 1 {
            MediaContentType::Multiple
        } else {
            MediaContentType::Single
        };

        Self {
            id: id.into(),
            platform,
            source: source.into(),
            created_at: None,
            title: None,
            description: None,
            author: None,
            content_type,
            thumbnail: None,
            items,
        }
    }
}

/// One downloadable piece of a post. `url` is the standard variant,
/// `original_url` the HD/original one when the provider has it.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct MediaFileItem {
    pub media_type: MediaType,
    pub url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl MediaFileItem {
    pub fn new(media_type: MediaType, url: Url) -> Self {
        Self {
            media_type,
            url,
            original_url: None,
            size: None,
            original_size: None,
            thumbnail: None,
            duration: None,
        }
    }

    pub fn with_original(mut self, original_url: Option<Url>) -> Self {
        self.original_url = original_url;
        self
    }

    pub fn with_sizes(mut self, size: Option<u64>, original_size: Option<u64>) -> Self {
        self.size = size;
        self.original_size = original_size;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<Url>) -> Self {
        self.thumbnail = thumbnail;
        self
    }
}

impl Cacheable for MediaFile {
    fn cache_prefix() -> &'static str {
        "media_file"
    }

    fn cache_key(&self) -> String {
        format!("{}:{}", self.platform.key(), self.id)
    }
}

#[derive(Debug, Clone)]
pub enum DownloadState {
    Success(MediaFile),
    NotFound,
}
