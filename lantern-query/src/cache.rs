//! Request-coalescing query cache.
//!
//! Each key owns at most one in-flight producer call. The call runs on its own
//! task and settles the entry when it finishes, so requesters that lose
//! interest (drop their future) never cancel or poison the shared result.
//! Everyone asking for a pending key awaits the same [`Shared`] handle.
//!
//! # Example
//!
//! ```ignore
//! let cache: QueryCache<ItemId, Option<Item>> = QueryCache::new("items");
//! let options = QueryOptions::new().with_stale_time(Duration::from_secs(300));
//!
//! let read = cache
//!     .fetch(id, move |id| async move { api.get_item(id).await }, &options)
//!     .await?;
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use lantern_core::{LanternError, LanternResult, QueryError};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::observer::QueryObserver;
use crate::options::QueryOptions;
use crate::read::QueryRead;
use crate::state::{CacheStats, QueryState, QueryStatus};

type SharedFetch<V> = Shared<BoxFuture<'static, LanternResult<V>>>;

struct CacheEntry<V> {
    status: QueryStatus,
    value: Option<V>,
    error: Option<LanternError>,
    resolved_at: Option<DateTime<Utc>>,
    /// Monotonic resolution time, used for staleness.
    resolved_instant: Option<Instant>,
    in_flight: Option<SharedFetch<V>>,
    /// Generation of the latest producer call; only that call may settle.
    generation: u64,
    invalidated: bool,
    state_tx: watch::Sender<QueryState<V>>,
}

impl<V: Clone> CacheEntry<V> {
    fn new() -> Self {
        let (state_tx, _) = watch::channel(QueryState::default());
        Self {
            status: QueryStatus::Idle,
            value: None,
            error: None,
            resolved_at: None,
            resolved_instant: None,
            in_flight: None,
            generation: 0,
            invalidated: false,
            state_tx,
        }
    }

    fn snapshot(&self) -> QueryState<V> {
        QueryState {
            status: self.status,
            data: self.value.clone(),
            error: self.error.clone(),
            updated_at: self.resolved_at,
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }

    /// The cached value when it may be served without a producer call.
    fn fresh_value(&self, options: &QueryOptions) -> Option<(V, DateTime<Utc>)> {
        if self.status != QueryStatus::Resolved || self.invalidated {
            return None;
        }
        let age = self.resolved_instant?.elapsed();
        if !options.is_fresh(age) {
            return None;
        }
        let value = self.value.clone()?;
        let resolved_at = self.resolved_at?;
        Some((value, resolved_at))
    }

    fn is_idle_for(&self, max_idle: Duration) -> bool {
        if self.in_flight.is_some() || self.state_tx.receiver_count() > 0 {
            return false;
        }
        match self.resolved_instant {
            Some(at) => at.elapsed() >= max_idle,
            None => true,
        }
    }
}

struct Inner<K, V> {
    name: String,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    /// Shared across entries so a recreated entry never reuses a generation.
    generations: AtomicU64,
}

impl<K, V> Inner<K, V>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn lock(&self) -> LanternResult<MutexGuard<'_, HashMap<K, CacheEntry<V>>>> {
        self.entries
            .lock()
            .map_err(|_| LanternError::from(QueryError::LockPoisoned))
    }

    /// Record the outcome of producer call `generation` for `key`.
    fn settle(&self, key: &K, generation: u64, result: &LanternResult<V>) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!(cache = %self.name, ?key, "cache lock poisoned, dropping fetch result");
            return;
        };
        let Some(entry) = entries.get_mut(key) else {
            trace!(cache = %self.name, ?key, "entry removed before fetch settled");
            return;
        };
        if entry.generation != generation {
            trace!(cache = %self.name, ?key, generation, "superseded fetch result ignored");
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.status = QueryStatus::Resolved;
                entry.value = Some(value.clone());
                entry.error = None;
                entry.resolved_at = Some(Utc::now());
                entry.resolved_instant = Some(Instant::now());
                entry.invalidated = false;
                debug!(cache = %self.name, ?key, "query resolved");
            }
            Err(err) => {
                entry.status = QueryStatus::Failed;
                entry.error = Some(err.clone());
                debug!(cache = %self.name, ?key, error = %err, "query failed");
            }
        }
        entry.publish();
    }
}

/// Process-wide cache of asynchronously produced values.
///
/// Cloning the handle shares the underlying entries.
pub struct QueryCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty cache. `name` only labels log lines.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                entries: Mutex::new(HashMap::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the value for `key`, calling `producer` only when nothing fresh is
    /// cached and no call is already in flight.
    ///
    /// Returns `Ok(None)` without touching the entry when the query is
    /// disabled. Producer errors are returned verbatim to every waiter; the
    /// next call after a failure starts a new producer call.
    pub async fn fetch<F, Fut>(
        &self,
        key: K,
        producer: F,
        options: &QueryOptions,
    ) -> LanternResult<Option<QueryRead<V>>>
    where
        F: FnOnce(K) -> Fut + Send + 'static,
        Fut: Future<Output = LanternResult<V>> + Send + 'static,
    {
        if !options.enabled {
            trace!(cache = %self.inner.name, ?key, "query disabled");
            return Ok(None);
        }

        let pending = {
            let mut entries = self.inner.lock()?;
            let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);

            if let Some((value, resolved_at)) = entry.fresh_value(options) {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                trace!(cache = %self.inner.name, ?key, "cache hit");
                return Ok(Some(QueryRead::from_cache(value, resolved_at)));
            }

            match entry.in_flight.clone() {
                Some(in_flight) => {
                    self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                    trace!(cache = %self.inner.name, ?key, "joined in-flight fetch");
                    in_flight
                }
                None => {
                    self.inner.misses.fetch_add(1, Ordering::Relaxed);
                    debug!(cache = %self.inner.name, ?key, "cache miss, starting fetch");
                    self.start_fetch(entry, key, producer)
                }
            }
        };

        let value = pending.await?;
        Ok(Some(QueryRead::from_fetch(value)))
    }

    /// Force a producer call for `key`, ignoring freshness. Joins the call
    /// already in flight if there is one.
    pub async fn refetch<F, Fut>(&self, key: K, producer: F) -> LanternResult<QueryRead<V>>
    where
        F: FnOnce(K) -> Fut + Send + 'static,
        Fut: Future<Output = LanternResult<V>> + Send + 'static,
    {
        let pending = {
            let mut entries = self.inner.lock()?;
            let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);
            match entry.in_flight.clone() {
                Some(in_flight) => {
                    self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                    in_flight
                }
                None => {
                    self.inner.misses.fetch_add(1, Ordering::Relaxed);
                    debug!(cache = %self.inner.name, ?key, "refetching");
                    self.start_fetch(entry, key, producer)
                }
            }
        };

        pending.await.map(QueryRead::from_fetch)
    }

    /// Spawn the producer and park its shared handle on the entry. Called
    /// with the entries lock held; nothing here awaits.
    fn start_fetch<F, Fut>(&self, entry: &mut CacheEntry<V>, key: K, producer: F) -> SharedFetch<V>
    where
        F: FnOnce(K) -> Fut + Send + 'static,
        Fut: Future<Output = LanternResult<V>> + Send + 'static,
    {
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        entry.generation = generation;
        entry.status = QueryStatus::Pending;

        let task_inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = producer(task_key.clone()).await;
            task_inner.settle(&task_key, generation, &result);
            result
        });

        // The entry holds this future, so it must not keep the cache alive.
        let weak: Weak<Inner<K, V>> = Arc::downgrade(&self.inner);
        let shared = async move {
            match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    let err = LanternError::from(QueryError::TaskAborted {
                        key: format!("{key:?}"),
                        reason: join_err.to_string(),
                    });
                    let result = Err(err);
                    if let Some(inner) = weak.upgrade() {
                        inner.settle(&key, generation, &result);
                    }
                    result
                }
            }
        }
        .boxed()
        .shared();

        entry.in_flight = Some(shared.clone());
        entry.publish();
        shared
    }

    /// Mark `key` stale so the next fetch calls the producer. Cached data
    /// stays readable through [`state`](Self::state) until then.
    pub fn invalidate(&self, key: &K) -> LanternResult<()> {
        let mut entries = self.inner.lock()?;
        if let Some(entry) = entries.get_mut(key) {
            entry.invalidated = true;
            debug!(cache = %self.inner.name, ?key, "query invalidated");
        }
        Ok(())
    }

    /// Mark every entry stale.
    pub fn invalidate_all(&self) -> LanternResult<()> {
        let mut entries = self.inner.lock()?;
        for entry in entries.values_mut() {
            entry.invalidated = true;
        }
        Ok(())
    }

    /// Drop the entry for `key`. Waiters on an in-flight call still receive
    /// its result; the result is just not stored.
    pub fn remove(&self, key: &K) -> LanternResult<bool> {
        Ok(self.inner.lock()?.remove(key).is_some())
    }

    /// Drop every entry and reset the statistics.
    pub fn clear(&self) -> LanternResult<()> {
        self.inner.lock()?.clear();
        self.inner.hits.store(0, Ordering::Relaxed);
        self.inner.misses.store(0, Ordering::Relaxed);
        self.inner.coalesced.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Remove settled entries nobody observes that resolved at least
    /// `max_idle` ago (or never resolved). Returns how many were removed.
    pub fn evict_expired(&self, max_idle: Duration) -> LanternResult<usize> {
        let mut entries = self.inner.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_idle_for(max_idle));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(cache = %self.inner.name, evicted, "evicted idle entries");
        }
        Ok(evicted)
    }

    /// Current state of `key`. Unknown keys report `Idle`.
    pub fn state(&self, key: &K) -> LanternResult<QueryState<V>> {
        let entries = self.inner.lock()?;
        Ok(entries
            .get(key)
            .map(CacheEntry::snapshot)
            .unwrap_or_default())
    }

    /// Cached value for `key`, fresh or not.
    pub fn peek(&self, key: &K) -> LanternResult<Option<V>> {
        let entries = self.inner.lock()?;
        Ok(entries.get(key).and_then(|entry| entry.value.clone()))
    }

    pub fn contains(&self, key: &K) -> LanternResult<bool> {
        Ok(self.inner.lock()?.contains_key(key))
    }

    pub fn stats(&self) -> LanternResult<CacheStats> {
        let entry_count = self.inner.lock()?.len();
        Ok(CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            coalesced: self.inner.coalesced.load(Ordering::Relaxed),
            entry_count,
        })
    }

    /// Subscribe to `key` and keep it loaded.
    ///
    /// Fetches once on subscription (when enabled) and, if
    /// `options.refetch_interval` is set, refetches on that period for as
    /// long as the observer lives. A failed refresh leaves the previous data
    /// in place. Must be called from within a tokio runtime.
    pub fn observe<F, Fut>(
        &self,
        key: K,
        producer: F,
        options: QueryOptions,
    ) -> LanternResult<QueryObserver<V>>
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LanternResult<V>> + Send + 'static,
    {
        let receiver = {
            let mut entries = self.inner.lock()?;
            entries
                .entry(key.clone())
                .or_insert_with(CacheEntry::new)
                .state_tx
                .subscribe()
        };

        let cache = self.clone();
        let producer = Arc::new(producer);
        let poller = tokio::spawn(async move {
            if !options.enabled {
                return;
            }

            let initial = Arc::clone(&producer);
            if let Err(err) = cache.fetch(key.clone(), move |k| initial(k), &options).await {
                debug!(cache = %cache.inner.name, ?key, error = %err, "observed query failed");
            }

            let Some(period) = options.refetch_interval else {
                return;
            };
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let next = Arc::clone(&producer);
                if let Err(err) = cache.refetch(key.clone(), move |k| next(k)).await {
                    warn!(
                        cache = %cache.inner.name,
                        ?key,
                        error = %err,
                        "background refresh failed, keeping previous data"
                    );
                }
            }
        });

        Ok(QueryObserver::new(receiver, poller))
    }
}

// =============================================================================
// TESTS
// =============================================================================
