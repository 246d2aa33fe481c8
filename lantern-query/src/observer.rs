//! Subscriptions to a single query.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::QueryState;

/// Live view of one cache entry, returned by
/// [`QueryCache::observe`](crate::QueryCache::observe).
///
/// Holds the background refresh task. Dropping the observer stops polling;
/// a fetch already in flight still completes and settles the entry.
pub struct QueryObserver<V> {
    receiver: watch::Receiver<QueryState<V>>,
    poller: JoinHandle<()>,
}

impl<V: Clone> QueryObserver<V> {
    pub(crate) fn new(receiver: watch::Receiver<QueryState<V>>, poller: JoinHandle<()>) -> Self {
        Self { receiver, poller }
    }

    /// Latest published state.
    pub fn current(&self) -> QueryState<V> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state change. Returns false once the entry is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Whether a change arrived since the last [`current`](Self::current)
    /// or [`mark_seen`](Self::mark_seen).
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    pub fn mark_seen(&mut self) {
        self.receiver.mark_unchanged();
    }
}

impl<V> Drop for QueryObserver<V> {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

#[cfg(test)]
mod tests {
    use crate::{QueryCache, QueryOptions, QueryStatus};
    use lantern_core::{LanternError, TransportError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn flaky_producer(
        calls: Arc<AtomicUsize>,
        fail_on: usize,
    ) -> impl Fn(u32) -> futures_util::future::BoxFuture<'static, Result<usize, LanternError>>
           + Send
           + Sync
           + 'static {
        use futures_util::FutureExt;
        move |_| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call == fail_on {
                    Err(TransportError::Timeout {
                        endpoint: "forecast".to_string(),
                    }
                    .into())
                } else {
                    Ok(call)
                }
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_loads_on_subscribe() {
        let cache: QueryCache<u32, usize> = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let mut observer = cache
            .observe(1, flaky_producer(Arc::clone(&calls), 0), QueryOptions::default())
            .unwrap();

        while !observer.current().is_success() {
            assert!(observer.changed().await);
        }
        assert_eq!(observer.current().data, Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_keeps_previous_data_on_failure() {
        let cache: QueryCache<u32, usize> = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::new()
            .with_stale_time(Duration::from_secs(60))
            .with_refetch_interval(Duration::from_secs(60));

        let observer = cache
            .observe(1, flaky_producer(Arc::clone(&calls), 2), options)
            .unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(observer.current().data, Some(1));

        // Second call fails: data stays, error surfaces.
        tokio::time::sleep(Duration::from_secs(60)).await;
        let state = observer.current();
        assert_eq!(state.status, QueryStatus::Failed);
        assert_eq!(state.data, Some(1));
        assert!(state.error.is_some());

        // Third call succeeds and replaces the value.
        tokio::time::sleep(Duration::from_secs(60)).await;
        let state = observer.current();
        assert_eq!(state.status, QueryStatus::Resolved);
        assert_eq!(state.data, Some(3));
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_observer_stops_polling() {
        let cache: QueryCache<u32, usize> = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::new().with_refetch_interval(Duration::from_secs(10));

        let observer = cache
            .observe(1, flaky_producer(Arc::clone(&calls), 0), options)
            .unwrap();
        tokio::time::sleep(Duration::from_secs(25)).await;
        let seen = calls.load(Ordering::SeqCst);
        assert_eq!(seen, 3);

        drop(observer);
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
        assert_eq!(cache.state(&1).unwrap().data, Some(3));
    }

    #[tokio::test]
    async fn test_disabled_observer_never_fetches() {
        let cache: QueryCache<u32, usize> = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let observer = cache
            .observe(1, flaky_producer(Arc::clone(&calls), 0), QueryOptions::disabled())
            .unwrap();
        tokio::task::yield_now().await;

        assert!(observer.current().is_idle());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
