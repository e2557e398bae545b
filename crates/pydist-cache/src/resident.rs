//! Bounded LRU cache with single-flight insertion.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

/// Default number of values that stay resident at once.
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

/// Point-in-time occupancy of a [`ResidentCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of values currently resident.
    pub entries: usize,
    /// Maximum number of resident values.
    pub capacity: usize,
}

/// A bounded, keyed cache of shared values with least-recently-used eviction.
///
/// Values enter through [`ResidentCache::get_or_try_insert`] and are handed
/// out as `Arc<T>` clones. When an insert pushes the cache past capacity the
/// least recently used entry is evicted; its backing resources are released
/// by the `Arc` drop once the last outstanding handle goes away, so an
/// in-flight read of an evicted value stays valid until it completes.
///
/// # Caching Strategy
///
/// - Lookups and inserts refresh recency, so repeatedly used values survive.
/// - Concurrent misses on one key collapse into a single builder run; the
///   losers of the race wait and then share the winner's value.
/// - A failed build inserts nothing and surfaces only to the caller that
///   ran it; waiters on the same flight find the key still absent and run
///   their own build.
///
/// # Thread Safety
///
/// This type is `Clone` and all clones share the same state through `Arc`.
/// Map operations take a short internal lock; builder futures run outside it,
/// guarded only by their key's flight lock.
pub struct ResidentCache<T> {
    inner: Arc<CacheInner<T>>,
}

struct CacheInner<T> {
    state: Mutex<CacheState<T>>,
}

struct CacheState<T> {
    entries: LruCache<String, Arc<T>>,
    flights: HashMap<String, Weak<AsyncMutex<()>>>,
}

impl<T> ResidentCache<T> {
    /// Creates a cache that keeps at most `capacity` values resident.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                state: Mutex::new(CacheState {
                    entries: LruCache::new(capacity),
                    flights: HashMap::new(),
                }),
            }),
        }
    }

    /// Returns the resident value for `key`, refreshing its recency.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.lock_state().entries.get(key).cloned()
    }

    /// Returns `true` if `key` is resident, without refreshing recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock_state().entries.contains(key)
    }

    /// Number of values currently resident.
    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    /// Returns `true` if no values are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident values.
    pub fn capacity(&self) -> usize {
        self.lock_state().entries.cap().get()
    }

    /// Snapshot of current occupancy.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock_state();
        CacheStats {
            entries: state.entries.len(),
            capacity: state.entries.cap().get(),
        }
    }

    /// Evicts every resident value.
    pub fn clear(&self) {
        let drained = {
            let mut state = self.lock_state();
            let capacity = state.entries.cap();
            std::mem::replace(&mut state.entries, LruCache::new(capacity))
        };
        drop(drained);
    }

    /// Returns the resident value for `key`, or builds and inserts one.
    ///
    /// The builder runs only on a miss, and only once per key at a time:
    /// concurrent callers for the same key wait on the winning flight and
    /// then pick up its value. Builds for distinct keys proceed in parallel.
    ///
    /// # Errors
    ///
    /// Propagates the builder's error. Nothing is inserted and the cache is
    /// left exactly as it was, so a later call will retry the build.
    pub async fn get_or_try_insert<F, Fut, E>(&self, key: &str, build: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let flight = self.flight(key);
        let _guard = flight.lock().await;

        // The flight winner may have published while this caller waited.
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = Arc::new(build().await?);
        self.publish(key, Arc::clone(&value));
        Ok(value)
    }

    /// Returns the flight lock for `key`, creating it on first use and
    /// pruning flights whose waiters are all gone.
    fn flight(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut state = self.lock_state();
        state.flights.retain(|_, flight| flight.strong_count() > 0);
        if let Some(flight) = state.flights.get(key).and_then(Weak::upgrade) {
            return flight;
        }
        let flight = Arc::new(AsyncMutex::new(()));
        state.flights.insert(key.to_owned(), Arc::downgrade(&flight));
        flight
    }

    /// Inserts `value` under `key`. Any displaced entry is dropped after the
    /// state lock is released, before this call returns.
    fn publish(&self, key: &str, value: Arc<T>) {
        let displaced = {
            let mut state = self.lock_state();
            state.entries.push(key.to_owned(), value)
        };
        drop(displaced);
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState<T>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for ResidentCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ResidentCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("ResidentCache")
            .field("entries", &stats.entries)
            .field("capacity", &stats.capacity)
            .finish_non_exhaustive()
    }
}
