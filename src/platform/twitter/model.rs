use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::platform::{MediaAuthor, MediaFileItem, MediaType, PlatformError};

static PHOTO_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
            media/
            (?P<id>[^.?]+)
            (?:\?.*format=|\.)
            (?P<format>\w+)
        ",
    )
    .context("Failed to create Twitter photo regex")
    .unwrap()
});

pub fn source_url(username: &str, id: &str) -> String {
    format!("https://twitter.com/{}/status/{}", username, id)
}

/// Photo item with the `large` rendition as standard and `orig` as original.
pub fn photo_item(url: &str) -> Result<MediaFileItem, PlatformError> {
    let caps = PHOTO_URL_REGEX
        .captures(url)
        .ok_or_else(|| PlatformError::ParsingError(format!("unexpected photo url: {}", url)))?;
    let base = format!(
        "https://pbs.twimg.com/media/{}?format={}",
        &caps["id"], &caps["format"]
    );

    Ok(
        MediaFileItem::new(MediaType::Image, Url::parse(&format!("{}&name=large", base))?)
            .with_original(Some(Url::parse(&format!("{}&name=orig", base))?)),
    )
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UrlEntity {
    pub url: String,
    pub expanded_url: Option<String>,
}

/// Expands every t.co link but the last one, which points at the attached
/// media and is dropped.
pub fn expand_text(text: &str, urls: &[UrlEntity]) -> String {
    let Some((last, rest)) = urls.split_last() else {
        return text.trim().to_string();
    };

    let mut text = text.to_string();
    for url in rest {
        if let Some(expanded) = &url.expanded_url {
            text = text.replace(&url.url, expanded);
        }
    }
    text.replace(&last.url, "").trim().to_string()
}

// --- API v2 ---

#[derive(Debug, Deserialize, Default)]
pub struct Entities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTweet {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entities: Entities,
}

#[derive(Debug, Deserialize)]
pub struct ApiMedia {
    #[serde(rename = "type")]
    pub media_type: String,
    pub url: Option<String>,
    pub preview_image_url: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiIncludes {
    #[serde(default)]
    pub media: Vec<ApiMedia>,
    #[serde(default)]
    pub users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProblem {
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTweetResponse {
    pub data: Option<ApiTweet>,
    #[serde(default)]
    pub includes: ApiIncludes,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

/// The parts of an API v2 lookup needed to build a media file.
#[derive(Debug)]
pub struct ApiTweetParts {
    pub tweet: ApiTweet,
    pub user: ApiUser,
    pub media: Vec<ApiMedia>,
}

impl TryFrom<ApiTweetResponse> for ApiTweetParts {
    type Error = PlatformError;

    fn try_from(response: ApiTweetResponse) -> Result<Self, Self::Error> {
        if let Some(problem) = response.errors.first() {
            return Err(PlatformError::provider(
                "Twitter API",
                format!("{}: {}", problem.title, problem.detail),
            ));
        }

        let tweet = response
            .data
            .ok_or_else(|| PlatformError::provider("Twitter API", "no tweet data"))?;
        let user = response
            .includes
            .users
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::provider("Twitter API", "no author"))?;
        if response.includes.media.is_empty() {
            return Err(PlatformError::provider("Twitter API", "tweet has no media"));
        }

        Ok(Self {
            tweet,
            user,
            media: response.includes.media,
        })
    }
}

impl ApiTweetParts {
    pub fn is_photo(&self) -> bool {
        self.media.first().is_some_and(|m| m.media_type == "photo")
    }

    pub fn author(&self) -> MediaAuthor {
        MediaAuthor {
            id: Some(self.user.id.clone()),
            name: Some(self.user.name.clone()),
            username: self.user.username.clone(),
        }
    }

    pub fn photo_items(&self) -> Result<Vec<MediaFileItem>, PlatformError> {
        self.media
            .iter()
            .filter_map(|m| m.url.as_deref())
            .map(photo_item)
            .collect()
    }
}

// --- tweetpik ---

#[derive(Debug, Deserialize)]
pub struct TweetPikVariant {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TweetPikResponse {
    #[serde(default)]
    pub variants: Vec<TweetPikVariant>,
}

impl TweetPikResponse {
    /// `(standard, original)`: the second to last and last variants.
    pub fn variant_urls(&self) -> Result<(Url, Url), PlatformError> {
        let len = self.variants.len();
        if len == 0 {
            return Err(PlatformError::provider("tweetpik", "no variants"));
        }
        let original = &self.variants[len - 1];
        let standard = &self.variants[(len + len - 2) % len];
        Ok((Url::parse(&standard.url)?, Url::parse(&original.url)?))
    }
}

// --- syndication ---

#[derive(Debug, Deserialize)]
pub struct SyndicationUser {
    pub id_str: Option<String>,
    pub name: String,
    pub screen_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SyndicationMediaEntity {
    pub url: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct SyndicationEntities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub media: Vec<SyndicationMediaEntity>,
}

#[derive(Debug, Deserialize)]
pub struct SyndicationVariant {
    pub bitrate: Option<u64>,
    pub content_type: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SyndicationVideoInfo {
    #[serde(default)]
    pub variants: Vec<SyndicationVariant>,
    pub duration_millis: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SyndicationMedia {
    #[serde(rename = "type")]
    pub media_type: String,
    pub media_url_https: String,
    pub video_info: Option<SyndicationVideoInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SyndicationTweet {
    pub id_str: String,
    #[serde(default)]
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub user: SyndicationUser,
    #[serde(default)]
    pub entities: SyndicationEntities,
    #[serde(default, rename = "mediaDetails")]
    pub media_details: Vec<SyndicationMedia>,
}

impl SyndicationTweet {
    pub fn author(&self) -> MediaAuthor {
        MediaAuthor {
            id: self.user.id_str.clone(),
            name: Some(self.user.name.clone()),
            username: self.user.screen_name.clone(),
        }
    }

    pub fn description(&self) -> String {
        let mut text = self.text.clone();
        for url in &self.entities.urls {
            if let Some(expanded) = &url.expanded_url {
                text = text.replace(&url.url, expanded);
            }
        }
        for media in &self.entities.media {
            text = text.replace(&media.url, "");
        }
        text.trim().to_string()
    }

    pub fn items(&self) -> Result<Vec<MediaFileItem>, PlatformError> {
        let mut items = Vec::new();
        for media in &self.media_details {
            match (media.media_type.as_str(), &media.video_info) {
                ("photo", _) => items.push(photo_item(&media.media_url_https)?),
                (_, Some(info)) => {
                    let mut mp4 = info
                        .variants
                        .iter()
                        .filter(|v| v.content_type == "video/mp4")
                        .collect::<Vec<_>>();
                    mp4.sort_by_key(|v| std::cmp::Reverse(v.bitrate.unwrap_or(0)));

                    let Some(best) = mp4.first() else { continue };
                    let standard = mp4.get(1).unwrap_or(best);

                    let mut item = MediaFileItem::new(MediaType::Video, Url::parse(&standard.url)?)
                        .with_original(Some(Url::parse(&best.url)?))
                        .with_thumbnail(Url::parse(&media.media_url_https).ok());
                    item.duration = info.duration_millis.map(|ms| ms / 1000);
                    items.push(item);
                }
                _ => warn!("Skipping syndication media of type {}", media.media_type),
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_item_from_both_url_shapes() {
        let item = photo_item("https://pbs.twimg.com/media/FUmXYZabc.jpg").unwrap();
        assert_eq!(
            item.url.as_str(),
            "https://pbs.twimg.com/media/FUmXYZabc?format=jpg&name=large"
        );
        assert_eq!(
            item.original_url.unwrap().as_str(),
            "https://pbs.twimg.com/media/FUmXYZabc?format=jpg&name=orig"
        );

        let item = photo_item("https://pbs.twimg.com/media/FUmXYZabc?format=png&name=small").unwrap();
        assert_eq!(
            item.url.as_str(),
            "https://pbs.twimg.com/media/FUmXYZabc?format=png&name=large"
        );

        assert!(photo_item("https://example.com/nothing").is_err());
    }

    #[test]
    fn test_expand_text_drops_media_link() {
        let urls = vec![
            UrlEntity {
                url: "https://t.co/aaa".into(),
                expanded_url: Some("https://example.com/article".into()),
            },
            UrlEntity {
                url: "https://t.co/media".into(),
                expanded_url: Some("https://twitter.com/x/status/1/photo/1".into()),
            },
        ];
        assert_eq!(
            expand_text("read https://t.co/aaa now https://t.co/media", &urls),
            "read https://example.com/article now"
        );
        assert_eq!(expand_text("  plain  ", &[]), "plain");
    }

    #[test]
    fn test_api_response_parts() {
        let json = r#"{
            "data": {
                "id": "1534",
                "text": "cats https://t.co/media",
                "created_at": "2022-06-07T12:00:00.000Z",
                "author_id": "99",
                "entities": {"urls": [{"url": "https://t.co/media", "expanded_url": "https://twitter.com/someone/status/1534/photo/1"}]}
            },
            "includes": {
                "media": [
                    {"media_key": "3_1", "type": "photo", "url": "https://pbs.twimg.com/media/AAA.jpg"},
                    {"media_key": "3_2", "type": "photo", "url": "https://pbs.twimg.com/media/BBB.png"}
                ],
                "users": [{"id": "99", "name": "Some One", "username": "someone"}]
            }
        }"#;
        let parts = ApiTweetParts::try_from(serde_json::from_str::<ApiTweetResponse>(json).unwrap()).unwrap();

        assert!(parts.is_photo());
        assert_eq!(parts.author().username, "someone");
        assert_eq!(expand_text(&parts.tweet.text, &parts.tweet.entities.urls), "cats");
        let items = parts.photo_items().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[1].url.as_str().contains("format=png"));
    }

    #[test]
    fn test_api_errors_are_provider_failures() {
        let json = r#"{"errors": [{"title": "Not Found Error", "detail": "Could not find tweet with id: [1]."}]}"#;
        let err = ApiTweetParts::try_from(serde_json::from_str::<ApiTweetResponse>(json).unwrap()).unwrap_err();
        assert!(err.to_string().contains("Not Found Error"));
    }

    #[test]
    fn test_tweetpik_variants() {
        let json = r#"{"variants": [{"url": "https://video.twimg.com/low.mp4"}, {"url": "https://video.twimg.com/mid.mp4"}, {"url": "https://video.twimg.com/high.mp4"}]}"#;
        let (standard, original) = serde_json::from_str::<TweetPikResponse>(json)
            .unwrap()
            .variant_urls()
            .unwrap();
        assert_eq!(standard.as_str(), "https://video.twimg.com/mid.mp4");
        assert_eq!(original.as_str(), "https://video.twimg.com/high.mp4");

        let json = r#"{"variants": [{"url": "https://video.twimg.com/only.mp4"}]}"#;
        let (standard, original) = serde_json::from_str::<TweetPikResponse>(json)
            .unwrap()
            .variant_urls()
            .unwrap();
        assert_eq!(standard, original);

        assert!(serde_json::from_str::<TweetPikResponse>(r#"{"variants": []}"#)
            .unwrap()
            .variant_urls()
            .is_err());
    }

    #[test]
    fn test_syndication_tweet() {
        let json = r#"{
            "__typename": "Tweet",
            "id_str": "1534",
            "text": "look https://t.co/link https://t.co/media",
            "created_at": "2022-06-07T12:00:00.000Z",
            "user": {"id_str": "99", "name": "Some One", "screen_name": "someone"},
            "entities": {
                "urls": [{"url": "https://t.co/link", "expanded_url": "https://example.com"}],
                "media": [{"url": "https://t.co/media"}]
            },
            "mediaDetails": [{
                "type": "video",
                "media_url_https": "https://pbs.twimg.com/ext_tw_video_thumb/1/pu/img/x.jpg",
                "video_info": {
                    "duration_millis": 12500,
                    "variants": [
                        {"content_type": "application/x-mpegURL", "url": "https://video.twimg.com/pl.m3u8"},
                        {"bitrate": 256000, "content_type": "video/mp4", "url": "https://video.twimg.com/256.mp4"},
                        {"bitrate": 2176000, "content_type": "video/mp4", "url": "https://video.twimg.com/2176.mp4"},
                        {"bitrate": 832000, "content_type": "video/mp4", "url": "https://video.twimg.com/832.mp4"}
                    ]
                }
            }]
        }"#;
        let tweet = serde_json::from_str::<SyndicationTweet>(json).unwrap();

        assert_eq!(tweet.description(), "look https://example.com");
        let items = tweet.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url.as_str(), "https://video.twimg.com/832.mp4");
        assert_eq!(
            items[0].original_url.as_ref().unwrap().as_str(),
            "https://video.twimg.com/2176.mp4"
        );
        assert_eq!(items[0].duration, Some(12));
    }
}
