use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::{sync::Arc, time::Duration};

use super::{Cache, StorageError};

#[derive(Clone, Debug)]
struct Entry<T> {
    value: T,
    expires_at: Option<DateTime<Utc>>,
}

impl<T> Entry<T> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Clone, Debug)]
pub struct MemoryCache<T: Clone> {
    cache: Arc<DashMap<String, Entry<T>>>,
    capacity: usize,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Arc::new(DashMap::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let now = Utc::now();
        let value = self.cache.get(key).and_then(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        });

        if value.is_none() {
            self.cache.remove_if(key, |_, entry| entry.is_expired(now));
        }

        value
    }

    pub fn set(&self, key: &str, value: &T, ttl: Option<Duration>) {
        if self.cache.len() >= self.capacity && !self.cache.contains_key(key) {
            self.evict();
        }

        let expires_at = ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok()).map(|ttl| Utc::now() + ttl);

        self.cache.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
    }

    pub fn del(&self, key: &str) {
        self.cache.remove(key);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    // Drops expired entries first, then an arbitrary one if still full.
    fn evict(&self) {
        let now = Utc::now();
        self.cache.retain(|_, entry| !entry.is_expired(now));

        if self.cache.len() >= self.capacity {
            let victim = self.cache.iter().next().map(|entry| entry.key().clone());
            if let Some(key) = victim {
                self.cache.remove(&key);
            }
        }
    }
}

#[async_trait]
impl Cache for MemoryCache<String> {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match MemoryCache::<String>::get(self, key) {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(value)?;
        MemoryCache::<String>::set(self, key, &serialized, ttl);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StorageError> {
        MemoryCache::<String>::del(self, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_del() {
        let cache = MemoryCache::<String>::new(4);
        assert_eq!(cache.get("a"), None);

        cache.set("a", &"1".to_string(), None);
        assert_eq!(cache.get("a").as_deref(), Some("1"));

        cache.set("a", &"2".to_string(), None);
        assert_eq!(cache.get("a").as_deref(), Some("2"));
        assert_eq!(cache.len(), 1);

        cache.del("a");
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = MemoryCache::<u32>::new(4);
        cache.set("gone", &1, Some(Duration::from_secs(0)));
        cache.set("kept", &2, Some(Duration::from_secs(60)));

        assert_eq!(cache.get("gone"), None);
        assert_eq!(cache.get("kept"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = MemoryCache::<u32>::new(2);
        cache.set("a", &1, None);
        cache.set("b", &2, None);
        cache.set("c", &3, None);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("c"), Some(3));
    }
}
