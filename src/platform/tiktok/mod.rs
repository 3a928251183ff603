pub mod model;

use async_trait::async_trait;
use reqwest::header;

use model::{thumbnail_url, LoveTikResponse, TikMateResponse, TikTokVideo, YouTube4KResponse};

use crate::service::http::HttpService;

use super::{
    traits::{MediaProvider, PlatformCapability},
    Link, MediaFile, MediaFileItem, MediaType, Platform, PlatformError,
};

pub struct PlatformTikTok {
    providers: Vec<Box<dyn MediaProvider>>,
}

impl PlatformTikTok {
    pub fn new(http: HttpService) -> Self {
        Self {
            providers: vec![
                Box::new(TikMate { http: http.clone() }),
                Box::new(LoveTik { http: http.clone() }),
                Box::new(YouTube4K { http }),
            ],
        }
    }
}

#[async_trait]
impl PlatformCapability for PlatformTikTok {
    fn platform_id(&self) -> Platform {
        Platform::TikTok
    }

    fn platform_name(&self) -> &str {
        "TikTok"
    }

    fn providers(&self) -> &[Box<dyn MediaProvider>] {
        &self.providers
    }
}

/// Probes both variants and builds the media file. A video whose standard
/// link has no size is treated as missing.
async fn into_media_file(
    http: &HttpService,
    provider: &'static str,
    video: TikTokVideo,
) -> Result<MediaFile, PlatformError> {
    let size = http.file_size(&video.link).await;
    if size == 0 {
        return Err(PlatformError::provider(provider, "no content"));
    }
    let size_hd = if video.link_hd == video.link {
        size
    } else {
        http.file_size(&video.link_hd).await
    };

    let item = MediaFileItem::new(MediaType::Video, video.link)
        .with_original(Some(video.link_hd))
        .with_sizes(Some(size), Some(size_hd))
        .with_thumbnail(Some(thumbnail_url(&video.id, 0)?));

    let mut media = MediaFile::new(Platform::TikTok, video.id.as_str(), video.source, vec![item]);
    media.thumbnail = Some(thumbnail_url(&video.id, 1)?);
    Ok(media)
}

struct TikMate {
    http: HttpService,
}

#[async_trait]
impl MediaProvider for TikMate {
    fn name(&self) -> &'static str {
        "TikMate"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        let request = self
            .http
            .client()
            .post("https://api.tikmate.app/api/lookup")
            .header(header::REFERER, "https://tikmate.app/")
            .form(&[("url", link.url.as_str())]);

        let response = self.http.send(request).await?.error_for_status()?;
        let video = TikTokVideo::try_from(response.json::<TikMateResponse>().await?)?;
        into_media_file(&self.http, self.name(), video).await
    }
}

struct LoveTik {
    http: HttpService,
}

#[async_trait]
impl MediaProvider for LoveTik {
    fn name(&self) -> &'static str {
        "LoveTik"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        let request = self
            .http
            .client()
            .post("https://lovetik.com/api/ajax/search")
            .header(header::REFERER, "https://lovetik.com/")
            .form(&[("query", link.url.as_str())]);

        let response = self.http.send(request).await?.error_for_status()?;
        let video = TikTokVideo::try_from(response.json::<LoveTikResponse>().await?)?;
        into_media_file(&self.http, self.name(), video).await
    }
}

struct YouTube4K {
    http: HttpService,
}

#[async_trait]
impl MediaProvider for YouTube4K {
    fn name(&self) -> &'static str {
        "YouTube4K"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        let request = self
            .http
            .client()
            .post("https://youtube4kdownloader.com/ajax/getLinks.php")
            .header(header::REFERER, "https://youtube4kdownloader.com/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .query(&[("video", link.url.as_str()), ("rand", "11")]);

        let response = self.http.send(request).await?.error_for_status()?;
        let video = TikTokVideo::try_from(response.json::<YouTube4KResponse>().await?)?;
        into_media_file(&self.http, self.name(), video).await
    }
}
