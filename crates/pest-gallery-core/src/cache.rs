//! Keyed stale-while-revalidate cache with in-flight request sharing.
//!
//! Every key owns a slot holding the last good value, the last error, and
//! at most one in-flight fetch. Readers of a cached key get the value right
//! away while a refresh runs in the background; concurrent readers of the
//! same key share one request. Subscribers observe state changes through a
//! `tokio::sync::watch` channel.

use crate::error::GalleryError;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

type FetchFuture<V> = BoxFuture<'static, Result<V, GalleryError>>;
type SharedFetch<V> = Shared<FetchFuture<V>>;
type Fetcher<K, V> = Arc<dyn Fn(K) -> FetchFuture<V> + Send + Sync>;

/// Observable state of one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyState<V> {
    /// Last successfully fetched value.
    pub data: Option<V>,
    /// Error from the most recent failed fetch; cleared on success.
    pub error: Option<GalleryError>,
    /// Whether a fetch is currently running for this key.
    pub loading: bool,
}

impl<V> Default for KeyState<V> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
        }
    }
}

impl<V> KeyState<V> {
    /// True until the first value or error arrives.
    pub fn is_pending(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

struct InFlight<V> {
    id: u64,
    /// Latest invalidation this fetch's result will reflect.
    epoch: u64,
    /// Queued follow-ups absorb further invalidations until they start.
    started: bool,
    fetch: SharedFetch<V>,
}

struct Slot<V> {
    /// Unique per slot; a fetch started for a forgotten slot never settles
    /// into its replacement.
    generation: u64,
    state: watch::Sender<KeyState<V>>,
    /// Bumped by every invalidation.
    epoch: u64,
    /// Epoch whose fetch last succeeded.
    fresh_epoch: Option<u64>,
    in_flight: Option<InFlight<V>>,
}

impl<V> Slot<V> {
    fn new(generation: u64) -> Self {
        let (state, _) = watch::channel(KeyState::default());
        Self {
            generation,
            state,
            epoch: 0,
            fresh_epoch: None,
            in_flight: None,
        }
    }

    fn is_stale(&self) -> bool {
        self.fresh_epoch != Some(self.epoch)
    }
}

struct CacheInner<K, V> {
    name: &'static str,
    revalidate_on_read: bool,
    fetcher: Fetcher<K, V>,
    slots: Mutex<HashMap<K, Slot<V>>>,
    /// Source of slot generations and fetch ids; never reset.
    next_id: AtomicU64,
}

/// Stale-while-revalidate cache keyed by `K`.
///
/// Cloning is cheap and every clone shares the same slots.
pub struct SwrCache<K, V> {
    inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for SwrCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SwrCache<K, V>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache that loads missing or stale keys with `fetcher`.
    ///
    /// With `revalidate_on_read` set, every read of a cached key also
    /// schedules a background refresh.
    pub fn new<F, Fut>(name: &'static str, revalidate_on_read: bool, fetcher: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, GalleryError>> + Send + 'static,
    {
        let fetcher: Fetcher<K, V> = Arc::new(move |key| fetcher(key).boxed());
        Self {
            inner: Arc::new(CacheInner {
                name,
                revalidate_on_read,
                fetcher,
                slots: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Return the cached value, fetching it first if the key has none.
    ///
    /// Stale cached values are returned immediately and refreshed in the
    /// background.
    pub async fn read(&self, key: &K) -> Result<V, GalleryError> {
        let fetch = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(key.clone()).or_insert_with(|| Slot::new(self.inner.next_id()));
            let cached = slot.state.borrow().data.clone();
            if let Some(data) = cached {
                if slot.is_stale() || self.inner.revalidate_on_read {
                    let _ = self.start_fetch(key, slot);
                }
                return Ok(data);
            }
            self.start_fetch(key, slot)
        };
        fetch.await
    }

    /// Mark the key stale and wait for a fresh value.
    pub async fn revalidate(&self, key: &K) -> Result<V, GalleryError> {
        let fetch = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(key.clone()).or_insert_with(|| Slot::new(self.inner.next_id()));
            slot.epoch += 1;
            self.start_fetch(key, slot)
        };
        fetch.await
    }

    /// Mark the key stale and refresh it in the background.
    ///
    /// Keys that were never read are left alone.
    pub fn invalidate(&self, key: &K) {
        let mut slots = self.inner.slots.lock();
        if let Some(slot) = slots.get_mut(key) {
            slot.epoch += 1;
            let _ = self.start_fetch(key, slot);
        }
    }

    /// Watch the key's state, starting a fetch if nothing fresh is cached.
    pub fn subscribe(&self, key: &K) -> watch::Receiver<KeyState<V>> {
        let mut slots = self.inner.slots.lock();
        let slot = slots.entry(key.clone()).or_insert_with(|| Slot::new(self.inner.next_id()));
        let receiver = slot.state.subscribe();
        if slot.in_flight.is_none() && slot.is_stale() {
            let _ = self.start_fetch(key, slot);
        }
        receiver
    }

    /// Snapshot of the key's current state.
    pub fn state(&self, key: &K) -> KeyState<V> {
        self.inner
            .slots
            .lock()
            .get(key)
            .map(|slot| slot.state.borrow().clone())
            .unwrap_or_default()
    }

    /// Whether a value is cached for the key.
    pub fn is_cached(&self, key: &K) -> bool {
        self.inner
            .slots
            .lock()
            .get(key)
            .is_some_and(|slot| slot.state.borrow().data.is_some())
    }

    /// Drop the key entirely; current subscribers see an empty state.
    pub fn forget(&self, key: &K) {
        if let Some(slot) = self.inner.slots.lock().remove(key) {
            debug!("forgetting cache key (cache={}, key={:?})", self.inner.name, key);
            slot.state.send_modify(|state| *state = KeyState::default());
        }
    }

    /// Join the current fetch or start a new one for the slot's epoch.
    ///
    /// A fetch started before the latest invalidation is not reused; the
    /// follow-up waits for it so only one request per key is on the wire.
    fn start_fetch(&self, key: &K, slot: &mut Slot<V>) -> SharedFetch<V> {
        if let Some(current) = slot.in_flight.as_mut()
            && (current.epoch == slot.epoch || !current.started)
        {
            current.epoch = slot.epoch;
            return current.fetch.clone();
        }

        let previous = slot.in_flight.as_ref().map(|current| current.fetch.clone());
        let id = self.inner.next_id();
        let generation = slot.generation;
        let epoch = slot.epoch;
        let started = previous.is_none();
        let weak: Weak<CacheInner<K, V>> = Arc::downgrade(&self.inner);
        let fetcher = Arc::clone(&self.inner.fetcher);
        let owned_key = key.clone();
        debug!(
            "starting fetch (cache={}, key={:?}, epoch={}, queued={})",
            self.inner.name, key, epoch, !started
        );

        let fetch = async move {
            let epoch = match previous {
                Some(previous) => {
                    let _ = previous.await;
                    weak.upgrade()
                        .and_then(|inner| inner.begin_queued(&owned_key, id))
                }
                None => Some(epoch),
            };
            let result = fetcher(owned_key.clone()).await;
            if let Some(inner) = weak.upgrade() {
                inner.settle(&owned_key, generation, id, epoch, &result);
            }
            result
        }
        .boxed()
        .shared();

        slot.in_flight = Some(InFlight {
            id,
            epoch,
            started,
            fetch: fetch.clone(),
        });
        slot.state.send_modify(|state| state.loading = true);
        tokio::spawn(fetch.clone());
        fetch
    }
}

impl<K, V> CacheInner<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Pin a queued follow-up to the epoch current at its start.
    fn begin_queued(&self, key: &K, id: u64) -> Option<u64> {
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(key)?;
        let epoch = slot.epoch;
        let current = slot.in_flight.as_mut().filter(|current| current.id == id)?;
        current.started = true;
        current.epoch = epoch;
        Some(epoch)
    }

    /// Record a finished fetch. Errors never discard cached data.
    fn settle(
        &self,
        key: &K,
        generation: u64,
        id: u64,
        epoch: Option<u64>,
        result: &Result<V, GalleryError>,
    ) {
        let mut slots = self.slots.lock();
        let Some(slot) = slots
            .get_mut(key)
            .filter(|slot| slot.generation == generation)
        else {
            debug!(
                "dropping result for forgotten key (cache={}, key={:?}, fetch={})",
                self.name, key, id
            );
            return;
        };
        if slot
            .in_flight
            .as_ref()
            .is_some_and(|current| current.id == id)
        {
            slot.in_flight = None;
        }
        let loading = slot.in_flight.is_some();
        match result {
            Ok(value) => {
                if epoch == Some(slot.epoch) {
                    slot.fresh_epoch = epoch;
                }
                slot.state.send_modify(|state| {
                    state.data = Some(value.clone());
                    state.error = None;
                    state.loading = loading;
                });
            }
            Err(err) => {
                warn!(
                    "fetch failed (cache={}, key={:?}, error={})",
                    self.name, key, err
                );
                slot.state.send_modify(|state| {
                    state.error = Some(err.clone());
                    state.loading = loading;
                });
            }
        }
    }
}
