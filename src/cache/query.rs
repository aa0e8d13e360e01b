//! Keyed query cache with request coalescing.
//!
//! Each [`QueryCache`] holds one query family. Reads return a fresh cached
//! value when there is one; otherwise they join the in-flight request for the
//! key or start a new one. Invalidation marks entries stale and detaches
//! in-flight requests, so a response that lands after the invalidation is
//! handed to its waiters but never written back as fresh.
//!
//! Lock order is always the entry map, then the in-flight table.

use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as FlightEntry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use super::keys::QueryFamily;
use super::lock::mutex_lock;
use super::state::QueryState;

const SOURCE: &str = "cache::query";

pub const METRIC_CACHE_HIT: &str = "storefront_catalog_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "storefront_catalog_cache_miss_total";
pub const METRIC_CACHE_COALESCED: &str = "storefront_catalog_cache_coalesced_total";
pub const METRIC_CACHE_INVALIDATED: &str = "storefront_catalog_cache_invalidated_total";
pub const METRIC_CACHE_EVICTED: &str = "storefront_catalog_cache_evicted_total";

/// A boxed request future producing one query result.
pub type Fetch<V, E> = BoxFuture<'static, Result<V, E>>;

struct Flight<V, E> {
    id: u64,
    future: Shared<Fetch<V, E>>,
}

struct Entry<V, E> {
    data: Option<V>,
    error: Option<E>,
    stale: bool,
    fetched_at: Instant,
}

impl<V, E> Entry<V, E> {
    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        self.data.is_some()
            && self.error.is_none()
            && !self.stale
            && ttl.is_none_or(|ttl| self.fetched_at.elapsed() < ttl)
    }
}

pub struct QueryCache<K, V, E> {
    family: QueryFamily,
    retain: bool,
    ttl: Option<Duration>,
    entries: Mutex<LruCache<K, Entry<V, E>>>,
    in_flight: DashMap<K, Flight<V, E>>,
    next_flight: AtomicU64,
}

impl<K, V, E> QueryCache<K, V, E>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a cache for `family` holding at most `capacity` entries.
    ///
    /// With `retain` off, results are shared with concurrent waiters but not kept.
    pub fn new(
        family: QueryFamily,
        capacity: NonZeroUsize,
        retain: bool,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            family,
            retain,
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: DashMap::new(),
            next_flight: AtomicU64::new(1),
        }
    }

    pub fn family(&self) -> QueryFamily {
        self.family
    }

    /// Return the cached value for `key`, or run `fetcher` once for all concurrent callers.
    ///
    /// `fetcher` is only invoked when this call starts a new request. The
    /// request runs on its own task and settles even if every caller stops
    /// waiting. Must be called within a Tokio runtime.
    pub async fn fetch<F>(self: &Arc<Self>, key: K, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fetch<V, E>,
    {
        if let Some(value) = self.fresh(&key) {
            counter!(METRIC_CACHE_HIT, "query" => self.family.as_str()).increment(1);
            debug!(query = %self.family, key = ?key, "Query cache hit");
            return Ok(value);
        }

        let flight = match self.in_flight.entry(key.clone()) {
            FlightEntry::Occupied(occupied) => {
                counter!(METRIC_CACHE_COALESCED, "query" => self.family.as_str()).increment(1);
                debug!(query = %self.family, key = ?key, "Joined in-flight query");
                occupied.get().future.clone()
            }
            FlightEntry::Vacant(vacant) => {
                counter!(METRIC_CACHE_MISS, "query" => self.family.as_str()).increment(1);
                debug!(query = %self.family, key = ?key, "Query cache miss, fetching");
                let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                let cache = Arc::clone(self);
                let request = fetcher();
                let future = async move {
                    let result = request.await;
                    cache.settle(key, id, &result);
                    result
                }
                .boxed()
                .shared();
                vacant.insert(Flight {
                    id,
                    future: future.clone(),
                });
                tokio::spawn(future.clone().map(drop));
                future
            }
        };

        flight.await
    }

    /// Mark one entry stale and detach its in-flight request.
    pub fn invalidate(&self, key: &K) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate");
        if let Some(entry) = entries.peek_mut(key) {
            entry.stale = true;
        }
        self.in_flight.remove(key);
        counter!(METRIC_CACHE_INVALIDATED, "query" => self.family.as_str()).increment(1);
        debug!(query = %self.family, key = ?key, "Query invalidated");
    }

    /// Mark every entry of the family stale and detach all in-flight requests.
    pub fn invalidate_all(&self) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate_all");
        for (_, entry) in entries.iter_mut() {
            entry.stale = true;
        }
        self.in_flight.clear();
        counter!(METRIC_CACHE_INVALIDATED, "query" => self.family.as_str()).increment(1);
        debug!(query = %self.family, entries = entries.len(), "Query family invalidated");
    }

    /// Drop the entry for `key` entirely, along with any in-flight request.
    pub fn evict(&self, key: &K) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "evict");
        entries.pop(key);
        self.in_flight.remove(key);
        counter!(METRIC_CACHE_EVICTED, "query" => self.family.as_str()).increment(1);
        debug!(query = %self.family, key = ?key, "Query evicted");
    }

    /// Snapshot of what a view bound to `key` would show.
    pub fn state(&self, key: &K) -> QueryState<V, E> {
        let fetching = self.in_flight.contains_key(key);
        let entries = mutex_lock(&self.entries, SOURCE, "state");
        let Some(entry) = entries.peek(key) else {
            return QueryState::Pending { fetching };
        };

        match (&entry.error, &entry.data) {
            (Some(error), data) => QueryState::Error {
                error: error.clone(),
                data: data.clone(),
                fetching,
            },
            (None, Some(data)) => QueryState::Success {
                data: data.clone(),
                stale: !entry.is_fresh(self.ttl),
                fetching,
            },
            (None, None) => QueryState::Pending { fetching },
        }
    }

    pub fn is_fetching(&self, key: &K) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh(&self, key: &K) -> Option<V> {
        if !self.retain {
            return None;
        }
        let mut entries = mutex_lock(&self.entries, SOURCE, "fresh");
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .and_then(|entry| entry.data.clone())
    }

    /// Record a finished request, unless an invalidation detached it meanwhile.
    fn settle(&self, key: K, id: u64, result: &Result<V, E>) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "settle");
        if self
            .in_flight
            .remove_if(&key, |_, flight| flight.id == id)
            .is_none()
        {
            debug!(query = %self.family, key = ?key, "Discarding result of detached query");
            return;
        }
        if !self.retain {
            return;
        }

        match result {
            Ok(value) => {
                let entry = Entry {
                    data: Some(value.clone()),
                    error: None,
                    stale: false,
                    fetched_at: Instant::now(),
                };
                self.store(&mut entries, key, entry);
            }
            Err(error) => match entries.get_mut(&key) {
                Some(entry) => {
                    entry.error = Some(error.clone());
                    entry.stale = true;
                }
                None => {
                    let entry = Entry {
                        data: None,
                        error: Some(error.clone()),
                        stale: true,
                        fetched_at: Instant::now(),
                    };
                    self.store(&mut entries, key, entry);
                }
            },
        }
    }

    fn store(&self, entries: &mut LruCache<K, Entry<V, E>>, key: K, entry: Entry<V, E>) {
        let evicted = entries.push(key.clone(), entry);
        if let Some((evicted, _)) = evicted.filter(|(evicted, _)| *evicted != key) {
            counter!(METRIC_CACHE_EVICTED, "query" => self.family.as_str()).increment(1);
            debug!(query = %self.family, key = ?evicted, "Query evicted for capacity");
        }
    }
}
