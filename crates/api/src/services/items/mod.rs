//! Inventory service with a cache-aside read path.
//!
//! Reads go to the cache first and fall back to the store, populating the
//! cache on the way out. Writes go to the store and then *delete* the cached
//! copy, so the next read always sees the write.
//!
//! A read that overlaps a write must not put the pre-write value back after
//! the write's invalidation ran. Every write stamps the item from a global
//! write counter; a read notes the counter before touching the store and
//! drops what it cached if the item was stamped since.
//!
//! Cache trouble never fails a read: a failed lookup counts as a miss and a
//! failed populate still returns the fresh value. A failed invalidation after
//! a successful write is reported, since a stale read is then possible until
//! the entry's TTL runs out.

mod error;

pub use error::ItemError;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, error, info, warn};

use stockroom_core::ItemId;

use crate::cache::{ItemCache, item_cache_key};
use crate::db::store::ItemStore;
use crate::models::item::{ItemInput, ItemView};

/// Item CRUD over an [`ItemStore`] and an [`ItemCache`].
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    cache: Arc<dyn ItemCache>,
    ttl: Duration,
    write_counter: AtomicU64,
    write_stamps: Cache<ItemId, u64>,
}

/// How long a write stamp is remembered. Must outlast any single read.
const WRITE_STAMP_TTL: Duration = Duration::from_secs(60);

impl ItemService {
    /// Create a new item service. Cached representations live for `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn ItemStore>, cache: Arc<dyn ItemCache>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            ttl,
            write_counter: AtomicU64::new(0),
            write_stamps: Cache::builder().time_to_live(WRITE_STAMP_TTL).build(),
        }
    }

    /// Fetch one item, from the cache when possible.
    ///
    /// A cached copy is returned as-is, without checking the store.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::NotFound` if the item doesn't exist, and
    /// `ItemError::Repository` if the store fails.
    pub async fn get(&self, id: ItemId) -> Result<ItemView, ItemError> {
        let key = item_cache_key(id);
        let read_started = self.write_counter.load(Ordering::SeqCst);

        match self.cache.get(&key).await {
            Ok(Some(view)) => {
                debug!(item_id = %id, "Item cache hit");
                return Ok(view);
            }
            Ok(None) => debug!(item_id = %id, "Item cache miss"),
            Err(e) => warn!(item_id = %id, error = %e, "Item cache read failed, using store"),
        }

        let item = self.store.get(id).await?.ok_or(ItemError::NotFound)?;
        let view = ItemView::from(item);

        if self.written_since(id, read_started).await {
            debug!(item_id = %id, "Item written during read, not caching");
            return Ok(view);
        }
        if let Err(e) = self.cache.set(&key, view.clone(), self.ttl).await {
            warn!(item_id = %id, error = %e, "Failed to cache item");
        }
        // A write stamped after the check above may have invalidated before
        // our set landed.
        if self.written_since(id, read_started).await
            && let Err(e) = self.cache.delete(&key).await
        {
            warn!(item_id = %id, error = %e, "Failed to drop item cached during a write");
        }
        Ok(view)
    }

    /// All items, oldest first. Always read from the store.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<ItemView>, ItemError> {
        let items = self.store.list().await?;
        Ok(items.into_iter().map(ItemView::from).collect())
    }

    /// Create an item. The cache is left cold for it.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::AlreadyExists` if the name is taken (checked
    /// before validation) and `ItemError::Validation` for bad fields.
    pub async fn create(&self, input: &ItemInput) -> Result<ItemView, ItemError> {
        if let Some(name) = input.name_hint()
            && self.store.exists_by_name(name).await?
        {
            warn!(name, "Attempt to create an item that already exists");
            return Err(ItemError::AlreadyExists);
        }

        let fields = input.validate().map_err(ItemError::Validation)?;
        // A concurrent create can still win between the check and here; the
        // store's unique index reports it as a conflict.
        let item = self.store.create(&fields).await?;

        info!(item_id = %item.id, "Item created");
        Ok(item.into())
    }

    /// Replace every writable field of an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::NotFound`, `ItemError::Validation`,
    /// `ItemError::AlreadyExists` when renamed onto another item, and
    /// `ItemError::Cache` if the stale copy could not be dropped.
    pub async fn update(&self, id: ItemId, input: &ItemInput) -> Result<ItemView, ItemError> {
        if self.store.get(id).await?.is_none() {
            return Err(ItemError::NotFound);
        }
        let fields = input.validate().map_err(ItemError::Validation)?;

        let item = self.store.update(id, &fields).await?;
        self.invalidate(id).await?;

        info!(item_id = %id, "Item updated");
        Ok(item.into())
    }

    /// Update only the supplied fields of an item.
    ///
    /// # Errors
    ///
    /// Same as [`ItemService::update`].
    pub async fn partial_update(
        &self,
        id: ItemId,
        input: &ItemInput,
    ) -> Result<ItemView, ItemError> {
        let current = self.store.get(id).await?.ok_or(ItemError::NotFound)?;
        let fields = input
            .validate_partial(&current)
            .map_err(ItemError::Validation)?;

        let item = self.store.update(id, &fields).await?;
        self.invalidate(id).await?;

        info!(item_id = %id, "Item partially updated");
        Ok(item.into())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::NotFound` if the item doesn't exist and
    /// `ItemError::Cache` if the stale copy could not be dropped.
    pub async fn delete(&self, id: ItemId) -> Result<(), ItemError> {
        self.store.delete(id).await?;
        self.invalidate(id).await?;

        info!(item_id = %id, "Item deleted");
        Ok(())
    }

    /// Whether `id` was written after the counter read `since`.
    async fn written_since(&self, id: ItemId, since: u64) -> bool {
        self.write_stamps
            .get(&id)
            .await
            .is_some_and(|stamp| stamp > since)
    }

    /// Stamp the write, then drop the cached copy. The stamp must be visible
    /// before the delete so an overlapping read either sees it or is deleted.
    async fn invalidate(&self, id: ItemId) -> Result<(), ItemError> {
        let stamp = self.write_counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.write_stamps.insert(id, stamp).await;

        self.cache.delete(&item_cache_key(id)).await.map_err(|e| {
            error!(item_id = %id, error = %e, "Failed to invalidate cached item");
            ItemError::Cache(e)
        })
    }
}
