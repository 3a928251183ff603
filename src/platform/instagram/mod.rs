pub mod model;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;

use model::SssResponse;

use crate::service::http::HttpService;

use super::{
    traits::{MediaProvider, PlatformCapability},
    Link, MediaFile, Platform, PlatformError,
};

const SSS_BASE: &str = "https://sssinstagram.com/";

pub struct PlatformInstagram {
    providers: Vec<Box<dyn MediaProvider>>,
}

impl PlatformInstagram {
    pub fn new(http: HttpService) -> Self {
        Self {
            providers: vec![Box::new(SssInstagram { http })],
        }
    }
}

#[async_trait]
impl PlatformCapability for PlatformInstagram {
    fn platform_id(&self) -> Platform {
        Platform::Instagram
    }

    fn platform_name(&self) -> &str {
        "Instagram"
    }

    fn providers(&self) -> &[Box<dyn MediaProvider>] {
        &self.providers
    }
}

struct SssInstagram {
    http: HttpService,
}

impl SssInstagram {
    /// Loads the landing page and returns its decoded `XSRF-TOKEN` cookie.
    async fn xsrf_token(&self) -> Result<String, PlatformError> {
        let response = self.http.send(self.http.client().get(SSS_BASE)).await?;
        let cookie = response
            .cookies()
            .find(|c| c.name() == "XSRF-TOKEN")
            .map(|c| c.value().to_string())
            .ok_or_else(|| PlatformError::provider(self.name(), "no XSRF-TOKEN cookie"))?;

        urlencoding::decode(&cookie)
            .map(|token| token.into_owned())
            .map_err(|e| PlatformError::provider(self.name(), e.to_string()))
    }
}

#[async_trait]
impl MediaProvider for SssInstagram {
    fn name(&self) -> &'static str {
        "SSSInstagram"
    }

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        let token = self.xsrf_token().await?;

        let request = self
            .http
            .client()
            .post(format!("{}request", SSS_BASE))
            .header(header::CONTENT_TYPE, "application/json;charset=utf-8")
            .header("X-XSRF-TOKEN", token)
            .json(&serde_json::json!({ "link": format!("{}/", link.url) }))
            .timeout(Duration::from_secs(5));

        let response = self.http.send(request).await?.error_for_status()?;
        let items = response.json::<SssResponse>().await?.into_items()?;

        Ok(MediaFile::new(Platform::Instagram, link.id.as_str(), link.url.as_str(), items))
    }
}
