use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::platform::PlatformError;

static STANDARD_FID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^bytevc1_540p_\d+-0")
        .context("Failed to create YouTube4K standard regex")
        .unwrap()
});

static HD_FID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^h264_540p_\d+-0")
        .context("Failed to create YouTube4K hd regex")
        .unwrap()
});

/// Download links of one video before sizes are probed.
#[derive(Debug, Clone, PartialEq)]
pub struct TikTokVideo {
    pub id: String,
    pub source: String,
    pub link: Url,
    pub link_hd: Url,
}

pub fn source_url(author: &str, id: &str) -> String {
    format!("https://www.tiktok.com/@{}/video/{}", author, id)
}

pub fn thumbnail_url(id: &str, location: u8) -> Result<Url, PlatformError> {
    Ok(Url::parse(&format!(
        "https://www.tiktok.com/api/img/?itemId={}&location={}",
        id, location
    ))?)
}

// --- TikMate ---

#[derive(Debug, Deserialize)]
pub struct TikMateResponse {
    pub success: bool,
    pub id: Option<String>,
    pub token: Option<String>,
    pub author_id: Option<String>,
}

impl TryFrom<TikMateResponse> for TikTokVideo {
    type Error = PlatformError;

    fn try_from(response: TikMateResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(PlatformError::provider("TikMate", "lookup was not successful"));
        }
        let (Some(id), Some(token)) = (response.id, response.token) else {
            return Err(PlatformError::provider("TikMate", "missing id or token"));
        };

        let link = format!("https://tikmate.app/download/{}/{}.mp4", token, id);
        Ok(Self {
            source: source_url(response.author_id.as_deref().unwrap_or_default(), &id),
            link_hd: Url::parse(&format!("{}?hd=1", link))?,
            link: Url::parse(&link)?,
            id,
        })
    }
}

// --- LoveTik ---

#[derive(Debug, Deserialize)]
pub struct LoveTikLink {
    pub a: String,
}

#[derive(Debug, Deserialize)]
pub struct LoveTikResponse {
    pub status: String,
    #[serde(default)]
    pub mess: String,
    pub vid: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub links: Vec<LoveTikLink>,
}

impl TryFrom<LoveTikResponse> for TikTokVideo {
    type Error = PlatformError;

    fn try_from(response: LoveTikResponse) -> Result<Self, Self::Error> {
        if response.status != "ok" || response.mess.starts_with("Error") {
            return Err(PlatformError::provider("LoveTik", response.mess));
        }
        let id = response
            .vid
            .ok_or_else(|| PlatformError::provider("LoveTik", "missing vid"))?;
        let link = response
            .links
            .first()
            .ok_or_else(|| PlatformError::provider("LoveTik", "no links"))?;
        let link = Url::parse(&link.a)?;
        let author = response.author.unwrap_or_default();

        Ok(Self {
            source: source_url(author.trim_start_matches('@'), &id),
            link_hd: link.clone(),
            link,
            id,
        })
    }
}

// --- YouTube4K ---

#[derive(Debug, Deserialize)]
pub struct YouTube4KFormat {
    pub fid: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct YouTube4KData {
    pub id: String,
    #[serde(default)]
    pub av: Vec<YouTube4KFormat>,
}

#[derive(Debug, Deserialize)]
pub struct YouTube4KResponse {
    pub status: String,
    pub data: Option<YouTube4KData>,
}

impl TryFrom<YouTube4KResponse> for TikTokVideo {
    type Error = PlatformError;

    fn try_from(response: YouTube4KResponse) -> Result<Self, Self::Error> {
        let data = match response.data {
            Some(data) if response.status == "success" => data,
            _ => return Err(PlatformError::provider("YouTube4K", response.status)),
        };

        let find = |pattern: &Regex| {
            data.av
                .iter()
                .rev()
                .find(|f| pattern.is_match(&f.fid))
                .map(|f| f.url.as_str())
        };

        let link = find(&STANDARD_FID).ok_or_else(|| PlatformError::provider("YouTube4K", "no standard format"))?;
        let link = Url::parse(link)?;
        let link_hd = match find(&HD_FID) {
            Some(hd) => Url::parse(hd)?,
            None => link.clone(),
        };

        Ok(Self {
            source: format!("https://m.tiktok.com/v/{}", data.id),
            id: data.id,
            link,
            link_hd,
        })
    }
}
