//! Tag-based cache for public read responses.
//!
//! Entries are stored as JSON values under a key (usually the request path)
//! together with a set of tags. Writes call [`PageCache::revalidate_tag`] with
//! the tags they affect, which evicts every entry carrying that tag.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Tag for the cuisine list and every cuisine page.
pub const CUISINES_TAG: &str = "cuisines";
/// Tag for restaurant listings (search, top-rated, per-cuisine).
pub const RESTAURANTS_TAG: &str = "restaurants";

/// Tag for everything rendered for one restaurant.
#[must_use]
pub fn restaurant_tag(restaurant_id: i64) -> String {
    format!("restaurant:{restaurant_id}")
}

/// Tag for pages that embed one cuisine's details.
#[must_use]
pub fn cuisine_tag(cuisine_id: i64) -> String {
    format!("cuisine:{cuisine_id}")
}

/// Entries kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct CacheInner {
    capacity: usize,
    next_seq: u64,
    entries: HashMap<String, CachedEntry>,
    by_tag: HashMap<String, HashSet<String>>,
    /// Insertion sequence to key, oldest first
    order: BTreeMap<u64, String>,
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Value,
    tags: Vec<String>,
    seq: u64,
}

impl CacheInner {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_seq: 0,
            entries: HashMap::new(),
            by_tag: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    /// Drops `key` from the entry map, its tags and the eviction order.
    fn remove(&mut self, key: &str) -> Option<CachedEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        for tag in &entry.tags {
            if let Some(keys) = self.by_tag.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_tag.remove(tag);
                }
            }
        }
        Some(entry)
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.order.pop_first() {
            self.remove(&key);
            trace!(key, "page cache evicted oldest entry");
        }
    }
}

/// Shared response cache; clones share the same storage.
///
/// Holds at most `capacity` entries. Storing a new key when full evicts the
/// oldest entry first.
#[derive(Debug, Clone)]
pub struct PageCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PageCache {
    /// Empty cache with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cache holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner::with_capacity(capacity))),
        }
    }

    /// Cached value for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let reader = self.inner.read().await;
        let hit = reader.entries.get(key).map(|e| e.value.clone());
        trace!(key, hit = hit.is_some(), "page cache lookup");
        hit
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub async fn put(&self, key: &str, tags: &[String], value: Value) {
        let mut writer = self.inner.write().await;
        writer.remove(key);
        while writer.entries.len() >= writer.capacity {
            writer.evict_oldest();
        }

        let seq = writer.next_seq;
        writer.next_seq += 1;
        for tag in tags {
            writer
                .by_tag
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        writer.order.insert(seq, key.to_string());
        writer.entries.insert(
            key.to_string(),
            CachedEntry {
                value,
                tags: tags.to_vec(),
                seq,
            },
        );
    }

    /// Evicts every entry tagged with `tag`. Returns how many were removed.
    pub async fn revalidate_tag(&self, tag: &str) -> usize {
        let mut writer = self.inner.write().await;
        let Some(keys) = writer.by_tag.remove(tag) else {
            return 0;
        };
        let removed = keys
            .iter()
            .filter(|key| writer.remove(key).is_some())
            .count();
        debug!(tag, removed, "page cache revalidated");
        removed
    }

    /// Evicts every tag in `tags`.
    pub async fn revalidate_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.revalidate_tag(tag.as_ref()).await;
        }
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = PageCache::new();
        assert!(cache.get("/api/cuisines").await.is_none());

        cache
            .put("/api/cuisines", &[CUISINES_TAG.to_string()], json!([1, 2]))
            .await;
        assert_eq!(cache.get("/api/cuisines").await, Some(json!([1, 2])));

        // Replacing keeps a single entry
        cache
            .put("/api/cuisines", &[CUISINES_TAG.to_string()], json!([3]))
            .await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("/api/cuisines").await, Some(json!([3])));
    }

    #[tokio::test]
    async fn test_revalidate_tag_evicts_tagged_entries_only() {
        let cache = PageCache::new();
        let page_tags = vec![restaurant_tag(1), RESTAURANTS_TAG.to_string()];
        cache.put("/api/restaurants/a", &page_tags, json!("a")).await;
        cache
            .put("/api/restaurants/b", &[restaurant_tag(2)], json!("b"))
            .await;
        cache
            .put("/api/restaurants", &[RESTAURANTS_TAG.to_string()], json!("list"))
            .await;

        assert_eq!(cache.revalidate_tag(&restaurant_tag(1)).await, 1);
        assert!(cache.get("/api/restaurants/a").await.is_none());
        assert!(cache.get("/api/restaurants/b").await.is_some());
        assert!(cache.get("/api/restaurants").await.is_some());

        // The evicted key no longer hangs off its other tags
        assert_eq!(cache.revalidate_tag(RESTAURANTS_TAG).await, 1);
        assert_eq!(cache.revalidate_tag("unknown").await, 0);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = PageCache::new();
        let other = cache.clone();
        other.put("k", &[CUISINES_TAG.to_string()], json!(true)).await;
        assert_eq!(cache.get("k").await, Some(json!(true)));
        cache.revalidate_tags([CUISINES_TAG]).await;
        assert!(other.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = PageCache::with_capacity(3);
        for i in 0..10 {
            cache
                .put(&format!("/api/restaurants?q={i}"), &[RESTAURANTS_TAG.to_string()], json!(i))
                .await;
        }
        assert_eq!(cache.len().await, 3);
        assert!(cache.get("/api/restaurants?q=6").await.is_none());
        assert_eq!(cache.get("/api/restaurants?q=9").await, Some(json!(9)));

        // Evicted keys are gone from their tags as well
        assert_eq!(cache.revalidate_tag(RESTAURANTS_TAG).await, 3);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_replacing_a_key_refreshes_its_age() {
        let cache = PageCache::with_capacity(2);
        cache.put("a", &[], json!(1)).await;
        cache.put("b", &[], json!(2)).await;
        cache.put("a", &[], json!(3)).await;
        cache.put("c", &[], json!(4)).await;

        assert!(cache.get("b").await.is_none());
        assert_eq!(cache.get("a").await, Some(json!(3)));
        assert_eq!(cache.len().await, 2);
    }
}
