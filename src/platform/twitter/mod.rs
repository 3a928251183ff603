pub mod model;

use async_trait::async_trait;
use reqwest::header;
use url::Url;

use model::{expand_text, source_url, ApiTweetParts, ApiTweetResponse, SyndicationTweet, TweetPikResponse};

use crate::service::http::HttpService;

use super::{
    traits::{MediaProvider, PlatformCapability},
    Link, MediaFile, MediaFileItem, MediaType, Platform, PlatformError,
};

pub struct PlatformTwitter {
    providers: Vec<Box<dyn MediaProvider>>,
}

impl PlatformTwitter {
    /// The official API is only tried when a bearer token is configured.
    pub fn new(http: HttpService, bearer_token: Option<String>) -> Self {
        let mut providers: Vec<Box<dyn MediaProvider>> = Vec::new();
        match bearer_token {
            Some(token) => providers.push(Box::new(TwitterApi {
                http: http.clone(),
                token,
            })),
            None => info!("TW_TOKEN not set, Twitter links go through syndication only"),
        }
        providers.push(Box::new(Syndication { http }));
        Self { providers }
    }
}

#[async_trait]
impl PlatformCapability for PlatformTwitter {
    fn platform_id(&self) -> Platform {
        Platform::Twitter
    }

    fn platform_name(&self) -> &str {
        "Twitter"
    }

    fn providers(&self) -> &[Box<dyn MediaProvider>] {
        &self.providers
    }
}

struct TwitterApi {
    http: HttpService,
    token: String,
}

impl TwitterApi {
    async fn video_item(&self, tweet_id: &str, thumbnail: Option<&str>) -> Result<MediaFileItem, PlatformError> {
        let request = self
            .http
            .client()
            .post(format!("https://tweetpik.com/api/tweets/{}/video", tweet_id))
            .header(header::REFERER, "https://tweetpik.com/twitter-downloader/");

        let response = self.http.send(request).await?.error_for_status()?;
        let (standard, original) = response.json::<TweetPikResponse>().await?.variant_urls()?;

        Ok(MediaFileItem::new(MediaType::Video, standard)
            .with_original(Some(original))
            .with_thumbnail(thumbnail.and_then(|t| Url::parse(t).ok())))
    }
}

#[async_trait]
impl MediaProvider for TwitterApi {
    fn name(&self) -> &'static str {
        "Twitter API"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        let request = self
            .http
            .client()
            .get(format!("https://api.twitter.com/2/tweets/{}", link.id))
            .bearer_auth(&self.token)
            .query(&[
                ("expansions", "attachments.media_keys,author_id"),
                ("tweet.fields", "id,text,created_at,entities"),
                ("user.fields", "id,name,username"),
                ("media.fields", "type,width,height,preview_image_url,url,duration_ms"),
            ]);

        // Errors come back as json with a non-2xx status too
        let response = self.http.send(request).await?;
        let parts = ApiTweetParts::try_from(response.json::<ApiTweetResponse>().await?)?;

        let items = if parts.is_photo() {
            parts.photo_items()?
        } else {
            let first = &parts.media[0];
            let mut item = self
                .video_item(&parts.tweet.id, first.preview_image_url.as_deref())
                .await?;
            item.duration = first.duration_ms.map(|ms| ms / 1000);
            vec![item]
        };

        let mut media = MediaFile::new(
            Platform::Twitter,
            parts.tweet.id.as_str(),
            source_url(&parts.user.username, &parts.tweet.id),
            items,
        );
        media.author = Some(parts.author());
        media.created_at = parts.tweet.created_at;
        media.description = Some(expand_text(&parts.tweet.text, &parts.tweet.entities.urls));
        Ok(media)
    }
}

struct Syndication {
    http: HttpService,
}

#[async_trait]
impl MediaProvider for Syndication {
    fn name(&self) -> &'static str {
        "Syndication"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        let request = self
            .http
            .client()
            .get("https://cdn.syndication.twimg.com/tweet-result")
            .query(&[("id", link.id.as_str()), ("token", "x")]);

        let response = self.http.send(request).await?.error_for_status()?;
        let tweet = response.json::<SyndicationTweet>().await?;

        let items = tweet.items()?;
        if items.is_empty() {
            return Err(PlatformError::provider(self.name(), "tweet has no media"));
        }

        let mut media = MediaFile::new(
            Platform::Twitter,
            tweet.id_str.as_str(),
            source_url(&tweet.user.screen_name, &tweet.id_str),
            items,
        );
        media.author = Some(tweet.author());
        media.created_at = tweet.created_at;
        media.description = Some(tweet.description());
        Ok(media)
    }
}
