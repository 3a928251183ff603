mod download;
mod error;
mod fallback;
mod link;
mod model;
pub mod traits;

pub mod instagram;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

use std::sync::Arc;

use dashmap::DashMap;

pub use error::*;
pub use fallback::resolve_with_fallback;
pub use link::{find_links, Link};
pub use model::*;
use traits::PlatformCapability;

pub use instagram::PlatformInstagram;
pub use tiktok::PlatformTikTok;
pub use twitter::PlatformTwitter;
pub use youtube::PlatformYouTube;

use crate::{config::AppConfig, service::http::HttpService};

#[derive(Clone)]
pub struct PlatformRegistry {
    platforms: Arc<DashMap<Platform, Arc<dyn PlatformCapability>>>,
}

impl PlatformRegistry {
    /// Empty registry, platforms are added with [`PlatformRegistry::register`].
    pub fn empty() -> Self {
        Self {
            platforms: Arc::new(DashMap::new()),
        }
    }

    pub fn new(config: &AppConfig) -> Result<Self, PlatformError> {
        info!("Initializing platform registry");

        let http = HttpService::new(&config.http, config.retry.provider_policy())?;
        let registry = Self::empty();

        info!("Registering TikTok platform");
        registry.register(Arc::new(PlatformTikTok::new(http.clone())));
        info!("Registering Twitter platform");
        registry.register(Arc::new(PlatformTwitter::new(
            http.clone(),
            config.twitter.bearer_token.clone(),
        )));
        info!("Registering Instagram platform");
        registry.register(Arc::new(PlatformInstagram::new(http.clone())));
        info!("Registering YouTube platform");
        registry.register(Arc::new(PlatformYouTube::new(http)));

        info!("Platform registry initialized");
        Ok(registry)
    }

    pub fn register(&self, platform: Arc<dyn PlatformCapability>) {
        self.platforms.insert(platform.platform_id(), platform);
    }

    pub fn get_platform(&self, platform: &Platform) -> Option<Arc<dyn PlatformCapability>> {
        self.platforms.get(platform).map(|p| p.value().clone())
    }

    pub fn get_supported_platforms(&self) -> Vec<Platform> {
        let mut platforms = self.platforms.iter().map(|p| *p.key()).collect::<Vec<_>>();
        platforms.sort();
        platforms
    }
}
