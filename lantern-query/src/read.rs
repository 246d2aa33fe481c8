//! Result of a cached query read, carrying freshness metadata.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A value returned by [`QueryCache::fetch`](crate::QueryCache::fetch).
///
/// Says whether the value came straight from the cache or from a producer call
/// (possibly one started by another requester) and when it was resolved.
#[derive(Debug, Clone)]
pub struct QueryRead<T> {
    value: T,
    fetched_at: DateTime<Utc>,
    was_cache_hit: bool,
}

impl<T> QueryRead<T> {
    /// A read served from a fresh cache entry.
    pub fn from_cache(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            fetched_at,
            was_cache_hit: true,
        }
    }

    /// A read served by awaiting a producer call.
    pub fn from_fetch(value: T) -> Self {
        Self {
            value,
            fetched_at: Utc::now(),
            was_cache_hit: false,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the value was resolved.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Time elapsed since the value was resolved.
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Map the inner value to a new type.
    pub fn map<U, F>(self, f: F) -> QueryRead<U>
    where
        F: FnOnce(T) -> U,
    {
        QueryRead {
            value: f(self.value),
            fetched_at: self.fetched_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}

impl<T> AsRef<T> for QueryRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
