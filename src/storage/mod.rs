mod error;
mod memory;
pub mod migration;
mod turso;
mod upstash;

pub use error::StorageError;
pub use memory::MemoryCache;
pub use turso::TursoClient;
pub use upstash::RedisClient;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::config::{CacheConfig, DatabaseConfig};

#[async_trait]
pub trait Cache: Send + Sync + 'static {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, StorageError>;
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError>;
    async fn del(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Clone)]
pub struct StorageManager {
    turso: TursoClient,
    redis: Option<RedisClient>,
}

impl StorageManager {
    pub async fn new(database: &DatabaseConfig, cache: &CacheConfig) -> Result<Self, StorageError> {
        let turso = TursoClient::new(database).await?;
        let applied = migration::migrate_up(&turso.connection()).await?;
        info!("Database schema up to date ({} migrations applied)", applied);

        let redis = match &cache.redis_url {
            Some(url) => Some(RedisClient::new(url).await?),
            None => {
                info!("REDIS_URL not set, media cache stays in memory");
                None
            }
        };

        Ok(Self { turso, redis })
    }

    pub fn turso(&self) -> &TursoClient {
        &self.turso
    }

    pub fn redis(&self) -> Option<&RedisClient> {
        self.redis.as_ref()
    }
}
