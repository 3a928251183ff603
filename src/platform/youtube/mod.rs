pub mod model;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;

use model::{SaveTubeResponse, ShortVideo, SsResponse};

use crate::service::http::HttpService;

use super::{
    traits::{MediaProvider, PlatformCapability},
    Link, MediaFile, MediaFileItem, MediaType, Platform, PlatformError,
};

pub struct PlatformYouTube {
    providers: Vec<Box<dyn MediaProvider>>,
}

impl PlatformYouTube {
    pub fn new(http: HttpService) -> Self {
        Self {
            providers: vec![Box::new(SaveTube { http: http.clone() }), Box::new(SsYouTube { http })],
        }
    }
}

#[async_trait]
impl PlatformCapability for PlatformYouTube {
    fn platform_id(&self) -> Platform {
        Platform::YouTube
    }

    fn platform_name(&self) -> &str {
        "YouTube"
    }

    fn providers(&self) -> &[Box<dyn MediaProvider>] {
        &self.providers
    }
}

/// `best` is sent as the original variant, `low` as the standard one.
async fn into_media_file(
    http: &HttpService,
    provider: &'static str,
    link: &Link,
    video: ShortVideo,
) -> Result<MediaFile, PlatformError> {
    let size = http.file_size(&video.best).await;
    if size == 0 {
        return Err(PlatformError::provider(provider, "no content"));
    }
    let size_low = if video.low == video.best {
        size
    } else {
        http.file_size(&video.low).await
    };

    let mut item = MediaFileItem::new(MediaType::Video, video.low)
        .with_original(Some(video.best))
        .with_sizes(Some(size_low), Some(size))
        .with_thumbnail(video.thumbnail.clone());
    item.duration = video.duration;

    let mut media = MediaFile::new(Platform::YouTube, link.id.as_str(), link.url.as_str(), vec![item]);
    media.title = video.title;
    media.thumbnail = video.thumbnail;
    Ok(media)
}

struct SaveTube {
    http: HttpService,
}

#[async_trait]
impl MediaProvider for SaveTube {
    fn name(&self) -> &'static str {
        "SaveTube"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        let request = self
            .http
            .client()
            .get("https://api.savetube.me/info")
            .header(header::REFERER, "https://ytshorts.savetube.me/")
            .query(&[("url", link.url.as_str())])
            .timeout(Duration::from_secs(3));

        let response = self.http.send(request).await?.error_for_status()?;
        let video = ShortVideo::try_from(response.json::<SaveTubeResponse>().await?)?;
        into_media_file(&self.http, self.name(), link, video).await
    }
}

struct SsYouTube {
    http: HttpService,
}

const SS_BASE: &str = "https://ssyoutube.com/en6/";

#[async_trait]
impl MediaProvider for SsYouTube {
    fn name(&self) -> &'static str {
        "SSYouTube"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        // Session cookies land in the shared jar
        self.http.send(self.http.client().get(SS_BASE)).await?;

        let request = self
            .http
            .client()
            .post("https://ssyoutube.com/api/convert")
            .header(header::REFERER, SS_BASE)
            .query(&[("url", link.url.as_str())])
            .timeout(Duration::from_secs(3));

        let response = self.http.send(request).await?;
        let video = ShortVideo::try_from(response.json::<SsResponse>().await?)?;
        into_media_file(&self.http, self.name(), link, video).await
    }
}
