use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::BotResult;
use crate::platform::PlatformRegistry;
use crate::service::{CacheService, SettingsService};
use crate::storage::StorageManager;

/// Everything handlers need, injected through the dispatcher's dependencies.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub platform_registry: Arc<PlatformRegistry>,
    pub cache: CacheService,
    pub settings: SettingsService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> BotResult<Self> {
        info!("Initializing AppState...");
        let storage = StorageManager::new(&config.database, &config.cache).await?;
        let platform_registry = Arc::new(PlatformRegistry::new(&config)?);
        Ok(Self::with_registry(config, storage, platform_registry))
    }

    pub fn with_registry(config: AppConfig, storage: StorageManager, platform_registry: Arc<PlatformRegistry>) -> Self {
        let cache = CacheService::new(&config.cache, &storage);
        let settings = SettingsService::new(&storage, config.cache.settings_capacity);
        info!("AppState initialized");

        Self {
            config: Arc::new(config),
            platform_registry,
            cache,
            settings,
        }
    }
}
