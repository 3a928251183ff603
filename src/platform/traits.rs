use async_trait::async_trait;

use super::{resolve_with_fallback, Link, MediaFile, Platform, PlatformError};

/// One third-party endpoint able to turn a link into media.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, link: &Link) -> Result<MediaFile, PlatformError>;
}

#[async_trait]
pub trait PlatformCapability: Send + Sync {
    fn platform_id(&self) -> Platform;

    fn platform_name(&self) -> &str;

    /// Providers in the order they are tried.
    fn providers(&self) -> &[Box<dyn MediaProvider>];

    async fn fetch_resource(&self, link: &Link) -> Result<MediaFile, PlatformError> {
        resolve_with_fallback(self.providers(), link).await
    }
}
