//! Per-query options.

use std::time::Duration;

/// Options controlling when a cached query fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// When false the query never fetches and its entry stays idle.
    pub enabled: bool,
    /// How long a resolved value counts as fresh. `None` keeps it fresh until
    /// it is invalidated.
    pub stale_time: Option<Duration>,
    /// Background refresh period for observed queries.
    pub refetch_interval: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_time: None,
            refetch_interval: None,
        }
    }
}

impl QueryOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a query that must not run.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enable or disable the query.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the stale time.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }

    /// Set the background refetch interval.
    pub fn with_refetch_interval(mut self, interval: Duration) -> Self {
        self.refetch_interval = Some(interval);
        self
    }

    /// Whether a value resolved `age` ago is still fresh.
    pub fn is_fresh(&self, age: Duration) -> bool {
        match self.stale_time {
            Some(stale_time) => age < stale_time,
            None => true,
        }
    }
}
