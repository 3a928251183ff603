use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::platform::PlatformError;

/// Links of one short before sizes are probed.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortVideo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<Url>,
    pub best: Url,
    pub low: Url,
    pub duration: Option<u64>,
}

/// Seconds from `ss`, `m:ss`, `h:mm:ss` or `d:h:mm:ss`.
pub fn parse_duration(text: &str) -> Option<u64> {
    const UNITS: [u64; 4] = [1, 60, 3600, 86400];

    let parts = text.trim().split(':').rev().collect::<Vec<_>>();
    if parts.is_empty() || parts.len() > UNITS.len() {
        return None;
    }
    parts.iter().zip(UNITS).try_fold(0u64, |total, (part, unit)| {
        let value = part.trim().parse::<u64>().ok()?.checked_mul(unit)?;
        total.checked_add(value)
    })
}

fn duration_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => parse_duration(s),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

// --- SaveTube ---

#[derive(Debug, Deserialize)]
pub struct SaveTubeFormat {
    pub url: Option<String>,
    pub quality: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SaveTubeData {
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Value,
    #[serde(default)]
    pub video_formats: Vec<SaveTubeFormat>,
}

#[derive(Debug, Deserialize)]
pub struct SaveTubeResponse {
    #[serde(default)]
    pub status: Value,
    pub data: Option<SaveTubeData>,
}

impl TryFrom<SaveTubeResponse> for ShortVideo {
    type Error = PlatformError;

    fn try_from(response: SaveTubeResponse) -> Result<Self, Self::Error> {
        let data = match response.data {
            Some(data) if is_truthy(&response.status) => data,
            _ => return Err(PlatformError::provider("SaveTube", "couldn't download video")),
        };

        let first = data
            .video_formats
            .first()
            .ok_or_else(|| PlatformError::provider("SaveTube", "no video formats"))?;
        let best = first
            .url
            .as_deref()
            .ok_or_else(|| PlatformError::provider("SaveTube", "best format has no url"))?;
        let best = Url::parse(best)?;

        let low = data.video_formats[1..]
            .iter()
            .find(|f| f.url.as_deref().is_some_and(|u| !u.is_empty()) && f.quality != first.quality)
            .and_then(|f| f.url.as_deref());
        let low = match low {
            Some(low) => Url::parse(low)?,
            None => best.clone(),
        };

        Ok(Self {
            duration: duration_value(&data.duration),
            thumbnail: data.thumbnail.as_deref().and_then(|t| Url::parse(t).ok()),
            id: data.id,
            title: data.title,
            best,
            low,
        })
    }
}

// --- SSYouTube ---

fn default_true() -> bool {
    true
}

fn default_ext() -> String {
    "mp4".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SsFormat {
    pub url: String,
    #[serde(default = "default_true")]
    pub downloadable: bool,
    #[serde(default = "default_true")]
    pub audio: bool,
    #[serde(default = "default_ext")]
    pub ext: String,
}

#[derive(Debug, Deserialize)]
pub struct SsMeta {
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Value,
}

#[derive(Debug, Deserialize)]
pub struct SsResponse {
    pub id: Option<String>,
    pub thumb: Option<String>,
    pub meta: Option<SsMeta>,
    #[serde(default)]
    pub url: Vec<SsFormat>,
    pub message: Option<String>,
}

impl TryFrom<SsResponse> for ShortVideo {
    type Error = PlatformError;

    fn try_from(response: SsResponse) -> Result<Self, Self::Error> {
        let Some(meta) = response.meta else {
            let reason = response.message.unwrap_or_else(|| "no meta".to_string());
            return Err(PlatformError::provider("SSYouTube", reason));
        };

        let mut candidates = response
            .url
            .iter()
            .filter(|f| f.downloadable && f.audio && matches!(f.ext.as_str(), "mp4" | "webm"));
        let best = candidates
            .next()
            .ok_or_else(|| PlatformError::provider("SSYouTube", "no downloadable format"))?;
        let best = Url::parse(&best.url)?;
        let low = match candidates.next() {
            Some(low) => Url::parse(&low.url)?,
            None => best.clone(),
        };

        Ok(Self {
            id: response.id,
            title: meta.title,
            thumbnail: response.thumb.as_deref().and_then(|t| Url::parse(t).ok()),
            duration: duration_value(&meta.duration),
            best,
            low,
        })
    }
}
