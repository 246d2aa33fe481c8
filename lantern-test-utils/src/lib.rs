//! Lantern Test Utilities
//!
//! Shared test infrastructure for the lantern workspace:
//! - Mock collaborators with call counting, latency and failure injection
//! - Proptest generators
//! - Fixtures for stories, comment threads and forecasts
//! - Assertions on `LanternResult`

pub use lantern_core::{
    timestamp_from_unix, Comment, Coordinates, CoordinatesResolver, DailyForecast, Forecast,
    HourlyForecast, Item, ItemId, ItemKind, LanternError, LanternResult, MinutelyPrecipitation,
    NotFoundError, Story, StoryApi, Timestamp, TransportError, WeatherProvider,
};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// MOCK COLLABORATORS
// ============================================================================

fn unavailable(endpoint: String) -> LanternError {
    TransportError::Status {
        endpoint,
        status: 503,
        message: "injected failure".to_string(),
    }
    .into()
}

/// In-memory story API.
///
/// Ids without an item answer `Ok(None)`, like the real API answering `null`.
#[derive(Debug, Default)]
pub struct MockStoryApi {
    top_ids: Vec<ItemId>,
    items: HashMap<ItemId, Item>,
    failing: HashSet<ItemId>,
    fail_list: bool,
    latency: Duration,
    list_calls: AtomicUsize,
    item_calls: Mutex<HashMap<ItemId, usize>>,
    started: Mutex<Vec<ItemId>>,
}

impl MockStoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item without listing it among the top ids.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.insert(item.id(), item);
        self
    }

    /// Add a story and append it to the top ids.
    pub fn with_top_story(mut self, story: Story) -> Self {
        self.top_ids.push(story.id);
        self.items.insert(story.id, Item::Story(story));
        self
    }

    /// Set the top ids directly, e.g. to include ids with no item.
    pub fn with_top_ids(mut self, ids: Vec<ItemId>) -> Self {
        self.top_ids = ids;
        self
    }

    /// Make `get_item(id)` fail with a transport error.
    pub fn failing_on(mut self, id: ItemId) -> Self {
        self.failing.insert(id);
        self
    }

    /// Make `list_top_ids` fail.
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Delay every call by `latency` (use with a paused tokio clock).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_item` calls for one id.
    pub fn item_calls(&self, id: ItemId) -> usize {
        self.item_calls
            .lock()
            .map(|calls| calls.get(&id).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of `get_item` calls over all ids.
    pub fn total_item_calls(&self) -> usize {
        self.item_calls
            .lock()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }

    /// Ids in the order their `get_item` calls started.
    pub fn started(&self) -> Vec<ItemId> {
        self.started
            .lock()
            .map(|started| started.clone())
            .unwrap_or_default()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl StoryApi for MockStoryApi {
    async fn list_top_ids(&self) -> LanternResult<Vec<ItemId>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.fail_list {
            return Err(unavailable("topstories.json".to_string()));
        }
        Ok(self.top_ids.clone())
    }

    async fn get_item(&self, id: ItemId) -> LanternResult<Option<Item>> {
        if let Ok(mut calls) = self.item_calls.lock() {
            *calls.entry(id).or_insert(0) += 1;
        }
        if let Ok(mut started) = self.started.lock() {
            started.push(id);
        }
        self.delay().await;
        if self.failing.contains(&id) {
            return Err(unavailable(format!("item/{id}.json")));
        }
        Ok(self.items.get(&id).cloned())
    }
}

/// City lookup backed by a fixed table. Matching ignores case.
#[derive(Debug, Default)]
pub struct MockCoordinatesResolver {
    cities: HashMap<String, Coordinates>,
    calls: AtomicUsize,
}

impl MockCoordinatesResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, name: &str, coordinates: Coordinates) -> Self {
        self.cities.insert(name.to_lowercase(), coordinates);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoordinatesResolver for MockCoordinatesResolver {
    async fn resolve(&self, city: &str) -> LanternResult<Coordinates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cities
            .get(&city.trim().to_lowercase())
            .copied()
            .ok_or_else(|| {
                NotFoundError::City {
                    query: city.to_string(),
                }
                .into()
            })
    }
}

/// Weather provider that builds a fixture forecast per call.
///
/// The current temperature equals the call number, so tests can tell
/// refreshed data from cached data.
#[derive(Debug, Default)]
pub struct MockWeatherProvider {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockWeatherProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Toggle failure of subsequent calls.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn fetch_forecast(&self, coordinates: Coordinates) -> LanternResult<Forecast> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable("onecall".to_string()));
        }
        let mut forecast = fixtures::forecast(coordinates);
        forecast.current_temp = Some(call as f64);
        Ok(forecast)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for lantern types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a story-API item id.
    pub fn arb_item_id() -> impl Strategy<Value = ItemId> {
        (1u64..50_000_000).prop_map(ItemId::new)
    }

    /// Generate `(list length, page size, item cap)` with a non-zero page size.
    pub fn arb_page_params() -> impl Strategy<Value = (usize, usize, usize)> {
        (0usize..2_000, 1usize..64, 0usize..1_000)
    }

    /// Generate valid coordinates.
    pub fn arb_coordinates() -> impl Strategy<Value = Coordinates> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinates { lat, lon })
    }

    /// Generate a comment, removed or not.
    pub fn arb_comment() -> impl Strategy<Value = Comment> {
        (
            arb_item_id(),
            proptest::option::of("[a-z]{3,12}"),
            proptest::collection::vec(arb_item_id(), 0..6),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(id, by, kids, deleted, dead)| Comment {
                id,
                by,
                parent: None,
                text: Some("<p>generated</p>".to_string()),
                time: fixtures::fixed_time(),
                kids,
                deleted,
                dead,
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built payloads for common scenarios.

    use super::*;

    /// 2023-11-14T22:13:20Z.
    pub fn fixed_time() -> Timestamp {
        timestamp_from_unix(1_700_000_000).unwrap_or_default()
    }

    /// A story with the given comment ids.
    pub fn story(id: u64, kids: &[u64]) -> Story {
        Story {
            id: ItemId::new(id),
            kind: ItemKind::Story,
            title: format!("Story {id}"),
            by: "pg".to_string(),
            score: 100,
            url: Some(format!("https://example.com/{id}")),
            time: fixed_time(),
            descendants: kids.len() as u32,
            kids: kids.iter().copied().map(ItemId::new).collect(),
            text: None,
        }
    }

    /// A live comment with the given replies.
    pub fn comment(id: u64, parent: u64, kids: &[u64]) -> Comment {
        Comment {
            id: ItemId::new(id),
            by: Some(format!("user{id}")),
            parent: Some(ItemId::new(parent)),
            text: Some(format!("<p>Comment {id}</p>")),
            time: fixed_time(),
            kids: kids.iter().copied().map(ItemId::new).collect(),
            deleted: false,
            dead: false,
        }
    }

    /// A comment the API reports as deleted.
    pub fn deleted_comment(id: u64, parent: u64) -> Comment {
        Comment {
            id: ItemId::new(id),
            by: None,
            parent: Some(ItemId::new(parent)),
            text: None,
            time: fixed_time(),
            kids: Vec::new(),
            deleted: true,
            dead: false,
        }
    }

    /// Story API with `count` top stories numbered from 1, no comments.
    pub fn front_page(count: u64) -> MockStoryApi {
        (1..=count).fold(MockStoryApi::new(), |api, id| api.with_top_story(story(id, &[])))
    }

    /// Story 42 with comments 43 and 44, where 44 has replies 45 and 100 and
    /// 100 is deleted.
    pub fn small_thread() -> MockStoryApi {
        MockStoryApi::new()
            .with_top_story(story(42, &[43, 44]))
            .with_item(Item::Comment(comment(43, 42, &[])))
            .with_item(Item::Comment(comment(44, 42, &[45, 100])))
            .with_item(Item::Comment(comment(45, 44, &[])))
            .with_item(Item::Comment(deleted_comment(100, 44)))
    }

    /// Seven-day forecast with a minute-level hour and a day of hourly data.
    pub fn forecast(coordinates: Coordinates) -> Forecast {
        let start = fixed_time();
        let at = |secs: i64| start + chrono::Duration::seconds(secs);

        Forecast {
            coordinates,
            timezone: "America/New_York".to_string(),
            current_temp: Some(72.0),
            minutely: Some(
                (0..60)
                    .map(|minute| MinutelyPrecipitation {
                        dt: at(minute * 60),
                        precipitation: if minute < 30 { 0.0 } else { 0.4 },
                    })
                    .collect(),
            ),
            hourly: (0..24)
                .map(|hour| HourlyForecast {
                    dt: at(hour * 3_600),
                    temp: 65.0 + hour as f64 / 2.0,
                    pop: (hour as f64 / 24.0).min(1.0),
                    rain_1h: (hour % 6 == 0).then_some(0.2),
                })
                .collect(),
            daily: (0..8)
                .map(|day| DailyForecast {
                    dt: at(day * 86_400),
                    temp_min: 55.0 + day as f64,
                    temp_max: 75.0 + day as f64,
                    summary: if day % 2 == 0 { "Clear" } else { "Rain" }.to_string(),
                    description: if day % 2 == 0 {
                        "clear sky"
                    } else {
                        "light rain"
                    }
                    .to_string(),
                    icon: "01d".to_string(),
                    rain: (day % 2 == 1).then_some(1.5),
                })
                .collect(),
        }
    }

    pub fn atlanta() -> Coordinates {
        Coordinates {
            lat: 33.749,
            lon: -84.388,
        }
    }

    pub fn new_york() -> Coordinates {
        Coordinates {
            lat: 40.7128,
            lon: -74.006,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on lantern results.

    use super::*;

    /// Assert that a LanternResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &LanternResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &LanternResult<T>) {
        match result {
            Err(LanternError::NotFound(_)) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_transport_error<T: std::fmt::Debug>(result: &LanternResult<T>) {
        match result {
            Err(LanternError::Transport(_)) => {}
            other => panic!("Expected Transport error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &LanternResult<T>) {
        match result {
            Err(LanternError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
