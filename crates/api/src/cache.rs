//! Item representation cache.
//!
//! The cache is a read-side copy of [`ItemView`]s keyed `item_{id}`. It is
//! never the source of truth: entries expire after their TTL and are deleted
//! whenever the item is written.
//!
//! Uses `moka` with a per-entry expiry policy, so each `set` decides how long
//! its entry lives.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use thiserror::Error;

use stockroom_core::ItemId;

use crate::models::item::ItemView;

/// Cache key for an item's representation.
#[must_use]
pub fn item_cache_key(id: ItemId) -> String {
    format!("item_{id}")
}

/// Errors a cache backend can report.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or refused the operation.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key-value cache with per-entry TTL.
#[async_trait]
pub trait ItemCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ItemView>, CacheError>;

    async fn set(&self, key: &str, value: ItemView, ttl: Duration) -> Result<(), CacheError>;

    /// Remove an entry. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Clone)]
struct CachedItem {
    view: ItemView,
    ttl: Duration,
}

/// Expires each entry after the TTL it was last written with.
struct PerEntryTtl;

impl Expiry<String, CachedItem> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedItem,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedItem,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process [`ItemCache`] built on `moka`.
#[derive(Clone)]
pub struct MokaItemCache {
    cache: Cache<String, CachedItem>,
}

impl MokaItemCache {
    /// Create a cache holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl ItemCache for MokaItemCache {
    async fn get(&self, key: &str) -> Result<Option<ItemView>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.view))
    }

    async fn set(&self, key: &str, value: ItemView, ttl: Duration) -> Result<(), CacheError> {
        self.cache
            .insert(key.to_owned(), CachedItem { view: value, ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use stockroom_core::{Price, Quantity, StockStatus};

    use super::*;

    fn view() -> ItemView {
        ItemView {
            id: ItemId::generate(),
            name: "Pallet".to_owned(),
            description: String::new(),
            quantity: Quantity::new(2).unwrap(),
            price: Price::new(Decimal::TEN).unwrap(),
            stock_status: StockStatus::InStock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_key_format() {
        let id: ItemId = "6f1c1b9e-2f7a-4c55-9d0e-1f2a3b4c5d6e".parse().unwrap();
        assert_eq!(
            item_cache_key(id),
            "item_6f1c1b9e-2f7a-4c55-9d0e-1f2a3b4c5d6e"
        );
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MokaItemCache::new(100);
        let view = view();
        let key = item_cache_key(view.id);

        assert!(cache.get(&key).await.unwrap().is_none());
        cache
            .set(&key, view.clone(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(view));

        cache.delete(&key).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
        // Deleting twice is fine.
        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_entries_expire_after_their_ttl() {
        let cache = MokaItemCache::new(100);
        let short = view();
        let long = view();

        cache
            .set("short", short, Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set("long", long.clone(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get("short").await.unwrap().is_none());
        assert_eq!(cache.get("long").await.unwrap(), Some(long));
    }
}
