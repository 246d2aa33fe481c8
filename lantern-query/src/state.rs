//! Observable query state and cache statistics.

use chrono::{DateTime, Utc};
use lantern_core::LanternError;

/// Lifecycle of a single cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    /// Never fetched, or the query is disabled.
    #[default]
    Idle,
    /// A producer call is in flight. Previously resolved data is kept.
    Pending,
    Resolved,
    /// The last producer call failed. Previously resolved data is kept.
    Failed,
}

/// Snapshot of one query as a consumer sees it.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    pub status: QueryStatus,
    /// Last successfully resolved value.
    pub data: Option<V>,
    /// Error from the last producer call, cleared on success.
    pub error: Option<LanternError>,
    /// When `data` was resolved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            updated_at: None,
        }
    }
}

impl<V> QueryState<V> {
    /// First load in progress: nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending && self.data.is_none()
    }

    /// Any producer call in progress, including background refreshes.
    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Resolved
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Failed
    }

    pub fn is_idle(&self) -> bool {
        self.status == QueryStatus::Idle
    }
}

/// Counters describing how requests were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Served from a fresh entry.
    pub hits: u64,
    /// Started a producer call.
    pub misses: u64,
    /// Joined a producer call already in flight.
    pub coalesced: u64,
    pub entry_count: usize,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0). Coalesced requests count as hits.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.coalesced;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::{ItemId, NotFoundError};

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 60,
            coalesced: 20,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_default_state_is_idle() {
        let state: QueryState<u32> = QueryState::default();
        assert!(state.is_idle());
        assert!(!state.is_loading());
        assert!(state.data.is_none());
    }

    #[test]
    fn test_refresh_is_fetching_not_loading() {
        let state = QueryState {
            status: QueryStatus::Pending,
            data: Some(1u32),
            error: None,
            updated_at: Some(Utc::now()),
        };
        assert!(state.is_fetching());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_failed_state_keeps_data() {
        let state = QueryState {
            status: QueryStatus::Failed,
            data: Some("old"),
            error: Some(NotFoundError::Item { id: ItemId::new(1) }.into()),
            updated_at: None,
        };
        assert!(state.is_error());
        assert_eq!(state.data, Some("old"));
    }
}
