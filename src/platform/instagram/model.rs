use serde::Deserialize;
use url::Url;

use crate::platform::{MediaFileItem, MediaType, PlatformError};

#[derive(Debug, Deserialize)]
pub struct Photo {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageNode {
    pub display_url: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
pub struct VideoNode {
    pub video_url: String,
    pub display_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SssItem {
    pub video: Option<VideoNode>,
    pub image: Option<ImageNode>,
}

impl TryFrom<&SssItem> for MediaFileItem {
    type Error = PlatformError;

    fn try_from(item: &SssItem) -> Result<Self, Self::Error> {
        if let Some(video) = &item.video {
            let thumbnail = video.display_url.as_deref().and_then(|u| Url::parse(u).ok());
            return Ok(MediaFileItem::new(MediaType::Video, Url::parse(&video.video_url)?).with_thumbnail(thumbnail));
        }

        let image = item
            .image
            .as_ref()
            .ok_or_else(|| PlatformError::provider("SSSInstagram", "item is neither image nor video"))?;
        // The third rendition is the full-size one
        let original = image.photos.get(2).or_else(|| image.photos.last());
        let original = original.map(|p| Url::parse(&p.url)).transpose()?;

        Ok(MediaFileItem::new(MediaType::Image, Url::parse(&image.display_url)?).with_original(original))
    }
}

#[derive(Debug, Deserialize)]
pub struct SssData {
    pub status: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub items: Vec<SssItem>,
    #[serde(flatten)]
    pub item: SssItem,
}

#[derive(Debug, Deserialize)]
pub struct SssResponse {
    pub data: SssData,
}

impl SssResponse {
    pub fn into_items(self) -> Result<Vec<MediaFileItem>, PlatformError> {
        let data = self.data;
        if data.status != 1 {
            return Err(PlatformError::provider("SSSInstagram", format!("status {}", data.status)));
        }

        if data.kind.as_deref() == Some("GraphSidecar") {
            data.items.iter().map(MediaFileItem::try_from).collect()
        } else {
            Ok(vec![MediaFileItem::try_from(&data.item)?])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_items() {
        let json = r#"{"data": {
            "status": 1,
            "type": "GraphSidecar",
            "items": [
                {"image": {"display_url": "https://cdn.ig.com/1-1080.jpg", "photos": [
                    {"url": "https://cdn.ig.com/1-320.jpg"},
                    {"url": "https://cdn.ig.com/1-640.jpg"},
                    {"url": "https://cdn.ig.com/1-1440.jpg"}
                ]}},
                {"video": {"video_url": "https://cdn.ig.com/2.mp4", "display_url": "https://cdn.ig.com/2.jpg"}}
            ]
        }}"#;
        let items = serde_json::from_str::<SssResponse>(json).unwrap().into_items().unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].media_type, MediaType::Image);
        assert_eq!(items[0].url.as_str(), "https://cdn.ig.com/1-1080.jpg");
        assert_eq!(
            items[0].original_url.as_ref().unwrap().as_str(),
            "https://cdn.ig.com/1-1440.jpg"
        );
        assert_eq!(items[1].media_type, MediaType::Video);
        assert_eq!(items[1].thumbnail.as_ref().unwrap().as_str(), "https://cdn.ig.com/2.jpg");
    }

    #[test]
    fn test_single_image_with_few_photos() {
        let json = r#"{"data": {
            "status": 1,
            "type": "GraphImage",
            "image": {"display_url": "https://cdn.ig.com/a.jpg", "photos": [{"url": "https://cdn.ig.com/a-big.jpg"}]}
        }}"#;
        let items = serde_json::from_str::<SssResponse>(json).unwrap().into_items().unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].original_url.as_ref().unwrap().as_str(),
            "https://cdn.ig.com/a-big.jpg"
        );
    }

    #[test]
    fn test_failed_status() {
        let json = r#"{"data": {"status": 0}}"#;
        assert!(serde_json::from_str::<SssResponse>(json).unwrap().into_items().is_err());
    }
}
