//! Collaborator traits
//!
//! The dashboard talks to four outside systems. Each one is a trait here so the
//! query layer and the UI can be driven by real HTTP clients or by mocks.

use async_trait::async_trait;

use crate::{Coordinates, CounterState, Forecast, Item, ItemId, LanternResult};

/// The public story API.
#[async_trait]
pub trait StoryApi: Send + Sync {
    /// Ordered top story ids (the API returns at most 500).
    async fn list_top_ids(&self) -> LanternResult<Vec<ItemId>>;

    /// Fetch one item. `Ok(None)` when the API answers `null`.
    async fn get_item(&self, id: ItemId) -> LanternResult<Option<Item>>;
}

/// Resolves a free-text city name to coordinates.
#[async_trait]
pub trait CoordinatesResolver: Send + Sync {
    /// Fails with `NotFoundError::City` when nothing matches.
    async fn resolve(&self, city: &str) -> LanternResult<Coordinates>;
}

/// Supplies forecasts for a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_forecast(&self, coordinates: Coordinates) -> LanternResult<Forecast>;
}

/// The persisted counter pair. No concurrency control: last writer wins.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn read_state(&self) -> LanternResult<CounterState>;

    /// Read the count, add `delta`, write it back.
    async fn apply_delta(&self, delta: i64) -> LanternResult<()>;

    async fn set_step(&self, step: i64) -> LanternResult<()>;
}
