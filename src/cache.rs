// Copyright 2025 Cowboy AI, LLC.

//! Tenant scoped result cache
//!
//! Entries are keyed by `(project, id)`, bounded by an LRU capacity and expire
//! after a per-entry lifetime. The cache is an explicit instance handed to the
//! resource client that owns the cached resource type.

use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::identifiers::ProjectId;
use crate::policy_api::resources::PolicyResource;

type CacheKey = (ProjectId, i64);

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: Option<DateTime<Utc>>,
}

impl<V> CachedEntry<V> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// LRU cache with per-entry expiry
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: Mutex<LruCache<CacheKey, CachedEntry<V>>>,
    default_ttl: Option<Duration>,
}

/// Cache of Policies
pub type PolicyCache = ResultCache<PolicyResource>;

impl<V: Clone> ResultCache<V> {
    /// Create a cache holding at most `capacity` entries
    ///
    /// `default_ttl` applies to [`put`](Self::put); `None` keeps entries until
    /// evicted or invalidated.
    pub fn new(capacity: usize, default_ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            default_ttl,
        }
    }

    /// Create a cache sized and timed from configuration
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.cache_capacity, config.cache_ttl())
    }

    /// Cached value for `id`, if present and not expired
    pub async fn get(&self, project_id: &ProjectId, id: impl Into<i64>) -> Option<V> {
        let key = (project_id.clone(), id.into());
        let mut entries = self.entries.lock().await;
        match entries.get(&key) {
            Some(entry) if !entry.is_expired(Utc::now()) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        debug!(project_id = %key.0, id = key.1, "Evicting expired cache entry");
        entries.pop(&key);
        None
    }

    /// Store `value` for `id` with an explicit lifetime, `None` never expires
    pub async fn set(&self, project_id: &ProjectId, id: impl Into<i64>, value: V, ttl: Option<Duration>) {
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        let key = (project_id.clone(), id.into());
        self.entries
            .lock()
            .await
            .put(key, CachedEntry { value, expires_at });
    }

    /// Store `value` for `id` with the default lifetime
    pub async fn put(&self, project_id: &ProjectId, id: impl Into<i64>, value: V) {
        self.set(project_id, id, value, self.default_ttl).await;
    }

    /// Drop the entry for `id`
    pub async fn invalidate(&self, project_id: &ProjectId, id: impl Into<i64>) {
        let key = (project_id.clone(), id.into());
        self.entries.lock().await.pop(&key);
    }

    /// Drop the entries for every id in `ids`
    pub async fn invalidate_many<I, T>(&self, project_id: &ProjectId, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        let mut entries = self.entries.lock().await;
        for id in ids {
            entries.pop(&(project_id.clone(), id.into()));
        }
    }

    /// Number of entries held, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str) -> ProjectId {
        ProjectId::new(name)
    }

    #[tokio::test]
    async fn test_entries_are_scoped_by_project() {
        let cache: ResultCache<String> = ResultCache::new(10, None);
        cache.put(&project("a"), 1, "first".to_string()).await;

        assert_eq!(cache.get(&project("a"), 1).await.as_deref(), Some("first"));
        assert_eq!(cache.get(&project("b"), 1).await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites_and_invalidate_removes() {
        let cache: ResultCache<u32> = ResultCache::new(10, None);
        cache.put(&project("a"), 1, 5).await;
        cache.put(&project("a"), 1, 6).await;
        assert_eq!(cache.get(&project("a"), 1).await, Some(6));

        cache.put(&project("a"), 2, 7).await;
        cache.invalidate(&project("a"), 1).await;
        assert_eq!(cache.get(&project("a"), 1).await, None);

        cache.invalidate_many(&project("a"), vec![2i64]).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_served() {
        let cache: ResultCache<u32> = ResultCache::new(10, None);
        cache
            .set(&project("a"), 1, 5, Some(Duration::from_millis(5)))
            .await;
        cache.set(&project("a"), 2, 6, None).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.get(&project("a"), 1).await, None);
        assert_eq!(cache.get(&project("a"), 2).await, Some(6));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let cache: ResultCache<u32> = ResultCache::new(2, None);
        cache.put(&project("a"), 1, 1).await;
        cache.put(&project("a"), 2, 2).await;
        assert_eq!(cache.get(&project("a"), 1).await, Some(1));
        cache.put(&project("a"), 3, 3).await;

        assert_eq!(cache.get(&project("a"), 2).await, None);
        assert_eq!(cache.get(&project("a"), 1).await, Some(1));
        assert_eq!(cache.get(&project("a"), 3).await, Some(3));
    }
}
