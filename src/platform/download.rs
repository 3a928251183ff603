use crate::service::{cache::CacheService, Cacheable};

use super::{DownloadState, Link, MediaFile, PlatformError, PlatformRegistry};

impl PlatformRegistry {
    /// Resolves `link` from the media cache or, on a miss, through the
    /// platform's provider chain. Cache failures only cost a refetch.
    pub async fn handle_download(&self, link: &Link, cache: &CacheService) -> Result<DownloadState, PlatformError> {
        let platform = self
            .get_platform(&link.platform)
            .ok_or_else(|| PlatformError::ResourceError(format!("{} is not registered", link.platform)))?;

        let key = format!("{}:{}", link.platform.key(), link.id);
        match cache.get::<MediaFile>(&key).await {
            Ok(Some(cached)) => {
                debug!("cache hit: {}", key);
                return Ok(DownloadState::Success(cached));
            }
            Ok(None) => debug!("cache miss: {}", key),
            Err(e) => warn!("Failed to read media cache for {}: {}", key, e),
        }

        debug!("Resolving {} through {}", link.url, platform.platform_name());
        match platform.fetch_resource(link).await {
            Ok(mut media) => {
                // Providers may report their own id, the cache is keyed by the link's
                media.id = link.id.clone();
                if let Err(e) = cache.set(&media).await {
                    warn!("Failed to cache {}: {}", media.cache_key(), e);
                }
                Ok(DownloadState::Success(media))
            }
            Err(PlatformError::NotFound(url)) => {
                info!("No provider could resolve {}", url);
                Ok(DownloadState::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}
