use super::{traits::MediaProvider, Link, MediaFile, PlatformError};

/// Tries each provider in turn and returns the first usable result.
pub async fn resolve_with_fallback(
    providers: &[Box<dyn MediaProvider>],
    link: &Link,
) -> Result<MediaFile, PlatformError> {
    for provider in providers {
        match provider.fetch(link).await {
            Ok(media) if media.items.is_empty() => {
                warn!("{} returned no media for {}", provider.name(), link.url);
            }
            Ok(media) => {
                info!("{} resolved {}", provider.name(), link.url);
                return Ok(media);
            }
            Err(e) => {
                warn!("{} failed for {}: {}", provider.name(), link.url, e);
            }
        }
    }

    Err(PlatformError::NotFound(link.url.clone()))
}
