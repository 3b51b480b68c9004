//! Record store: cached reads of the pest collection and single records.

use crate::api::PestApi;
use crate::cache::{KeyState, SwrCache};
use crate::error::GalleryError;
use log::debug;
use pest_gallery_protocol::{Record, RecordId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Cache key for the full collection, named after its endpoint path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey(String);

impl CollectionKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CollectionKey {
    fn default() -> Self {
        Self::new("/pest")
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared read-through cache in front of a [`PestApi`].
///
/// Clones share the same caches, so every view sees writes made through any
/// of them.
#[derive(Clone)]
pub struct RecordStore {
    api: Arc<dyn PestApi>,
    collection_key: CollectionKey,
    collections: SwrCache<CollectionKey, Vec<Record>>,
    records: SwrCache<RecordId, Record>,
}

impl RecordStore {
    /// Build a store over `api`; see [`SwrCache::new`] for `revalidate_on_read`.
    pub fn new(api: Arc<dyn PestApi>, revalidate_on_read: bool) -> Self {
        let list_api = Arc::clone(&api);
        let collections = SwrCache::new("collection", revalidate_on_read, move |key: CollectionKey| {
            let api = Arc::clone(&list_api);
            async move {
                debug!("fetching collection (key={})", key);
                api.list().await
            }
        });
        let record_api = Arc::clone(&api);
        let records = SwrCache::new("record", revalidate_on_read, move |id: RecordId| {
            let api = Arc::clone(&record_api);
            async move {
                debug!("fetching record (id={})", id);
                api.get(&id).await
            }
        });
        Self {
            api,
            collection_key: CollectionKey::default(),
            collections,
            records,
        }
    }

    pub fn api(&self) -> &Arc<dyn PestApi> {
        &self.api
    }

    /// All records, served from cache when available.
    pub async fn read(&self) -> Result<Vec<Record>, GalleryError> {
        self.collections.read(&self.collection_key).await
    }

    /// One record, served from cache when available.
    pub async fn read_one(&self, id: &RecordId) -> Result<Record, GalleryError> {
        self.records.read(id).await
    }

    /// Watch the collection; the first subscriber triggers a fetch.
    pub fn subscribe(&self) -> watch::Receiver<KeyState<Vec<Record>>> {
        self.collections.subscribe(&self.collection_key)
    }

    /// Watch one record; the first subscriber triggers a fetch.
    pub fn subscribe_record(&self, id: &RecordId) -> watch::Receiver<KeyState<Record>> {
        self.records.subscribe(id)
    }

    pub fn collection_state(&self) -> KeyState<Vec<Record>> {
        self.collections.state(&self.collection_key)
    }

    /// Refresh the collection in the background.
    pub fn invalidate(&self) {
        self.collections.invalidate(&self.collection_key);
    }

    /// Refresh the collection and wait for the result.
    pub async fn revalidate(&self) -> Result<Vec<Record>, GalleryError> {
        self.collections.revalidate(&self.collection_key).await
    }

    /// Refresh a single record in the background if it is cached.
    pub fn invalidate_record(&self, id: &RecordId) {
        self.records.invalidate(id);
    }

    /// Drop a record from the cache, e.g. after it was deleted.
    pub fn forget_record(&self, id: &RecordId) {
        self.records.forget(id);
    }

    pub fn is_record_cached(&self, id: &RecordId) -> bool {
        self.records.is_cached(id)
    }
}
