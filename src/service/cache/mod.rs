mod error;

pub use error::*;

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::CacheConfig,
    storage::{Cache, MemoryCache, RedisClient, StorageManager},
};

pub trait Cacheable: Serialize + DeserializeOwned + Send + Sync {
    fn cache_prefix() -> &'static str;
    fn cache_key(&self) -> String;
}

#[derive(Clone)]
enum Backend {
    Memory(MemoryCache<String>),
    Redis(RedisClient),
}

/// Cache of resolved media. Redis when configured, process memory otherwise.
#[derive(Clone)]
pub struct CacheService {
    backend: Backend,
    ttl: Duration,
}

impl CacheService {
    pub fn new(config: &CacheConfig, storage: &StorageManager) -> Self {
        let ttl = Duration::from_secs(config.media_ttl_secs);
        match storage.redis() {
            Some(redis) => Self {
                backend: Backend::Redis(redis.clone()),
                ttl,
            },
            None => Self::memory(config.media_capacity, ttl),
        }
    }

    pub fn memory(capacity: usize, ttl: Duration) -> Self {
        Self {
            backend: Backend::Memory(MemoryCache::new(capacity)),
            ttl,
        }
    }

    fn prefixed<T: Cacheable>(key: &str) -> String {
        format!("{}:{}", T::cache_prefix(), key)
    }

    pub async fn get<T: Cacheable>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let key = Self::prefixed::<T>(key);
        let value = match &self.backend {
            Backend::Memory(cache) => Cache::get::<T>(cache, &key).await?,
            Backend::Redis(cache) => cache.get::<T>(&key).await?,
        };
        Ok(value)
    }

    pub async fn set<T: Cacheable>(&self, value: &T) -> Result<(), CacheError> {
        let key = Self::prefixed::<T>(&value.cache_key());
        match &self.backend {
            Backend::Memory(cache) => Cache::set(cache, &key, value, Some(self.ttl)).await?,
            Backend::Redis(cache) => cache.set(&key, value, Some(self.ttl)).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        id: u32,
    }

    impl Cacheable for Sample {
        fn cache_prefix() -> &'static str {
            "sample"
        }

        fn cache_key(&self) -> String {
            self.id.to_string()
        }
    }

    #[tokio::test]
    async fn test_memory_roundtrip_uses_prefix() {
        let cache = CacheService::memory(4, Duration::from_secs(60));
        cache.set(&Sample { id: 3 }).await.unwrap();

        assert_eq!(cache.get::<Sample>("3").await.unwrap(), Some(Sample { id: 3 }));
        assert_eq!(cache.get::<Sample>("4").await.unwrap(), None);
    }
}
