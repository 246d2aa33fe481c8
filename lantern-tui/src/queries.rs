//! Query handles behind the dashboard views.
//!
//! The views read these caches synchronously on every frame; the app starts
//! fetches on background tasks and redraws when they settle.

use std::sync::Arc;
use std::time::Duration;

use lantern_core::{
    Coordinates, CoordinatesResolver, CounterState, CounterStore, Forecast, Item, ItemId,
    LanternResult, QueryError, Story, StoryApi, ValidationError, WeatherProvider,
};
use lantern_query::{
    CommentThreads, PageConfig, PageFetch, PagedSequence, QueryCache, QueryObserver,
    QueryOptions, QueryRead, QueryState, ResolvedTree, TopStories, TreeFetcher, TreeSource,
};
use tracing::debug;

use crate::config::TuiConfig;

/// City used when the search box is submitted empty.
pub const FALLBACK_CITY: &str = "New York";

/// The weather collaborators, present only when an API key is configured.
#[derive(Clone)]
pub struct WeatherServices {
    pub resolver: Arc<dyn CoordinatesResolver>,
    pub provider: Arc<dyn WeatherProvider>,
}

/// Everything the dashboard talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub stories: Arc<dyn StoryApi>,
    pub weather: Option<WeatherServices>,
    pub counter: Arc<dyn CounterStore>,
}

#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub page: PageConfig,
    pub comment_stale: Duration,
    pub weather_stale: Duration,
    pub weather_poll: Duration,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            comment_stale: Duration::from_secs(300),
            weather_stale: Duration::from_secs(60),
            weather_poll: Duration::from_secs(60),
        }
    }
}

impl QuerySettings {
    pub fn from_config(config: &TuiConfig) -> Self {
        Self {
            page: PageConfig::new()
                .with_page_size(config.page_size)
                .with_max_items(config.max_stories),
            comment_stale: config.comment_stale_time(),
            weather_stale: config.weather_stale_time(),
            weather_poll: config.weather_poll_interval(),
        }
    }
}

/// Trim a city query, falling back to [`FALLBACK_CITY`] when blank.
pub fn normalize_city(city: &str) -> String {
    let city = city.trim();
    if city.is_empty() {
        FALLBACK_CITY.to_string()
    } else {
        city.to_string()
    }
}

pub struct Queries {
    stories: PagedSequence<TopStories>,
    threads: Arc<CommentThreads>,
    comments: TreeFetcher<CommentThreads>,
    coordinates: QueryCache<String, Coordinates>,
    forecasts: QueryCache<(i64, i64), Forecast>,
    counter: QueryCache<(), CounterState>,
    weather: Option<WeatherServices>,
    counter_store: Arc<dyn CounterStore>,
    settings: QuerySettings,
}

impl Queries {
    pub fn new(collaborators: Collaborators, settings: QuerySettings) -> Self {
        let threads = Arc::new(CommentThreads::new(Arc::clone(&collaborators.stories)));
        let node_options = QueryOptions::new().with_stale_time(settings.comment_stale);
        Self {
            stories: PagedSequence::new(
                Arc::new(TopStories::new(collaborators.stories)),
                settings.page.clone(),
            ),
            comments: TreeFetcher::with_options(Arc::clone(&threads), node_options),
            threads,
            coordinates: QueryCache::new("coordinates"),
            forecasts: QueryCache::new("forecast"),
            counter: QueryCache::new("counter"),
            weather: collaborators.weather,
            counter_store: collaborators.counter,
            settings,
        }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    // ========================================================================
    // STORIES
    // ========================================================================

    pub fn stories(&self) -> &PagedSequence<TopStories> {
        &self.stories
    }

    pub async fn load_next_page(&self) -> LanternResult<PageFetch<Story>> {
        self.stories.fetch_next_page().await
    }

    // ========================================================================
    // STORY DETAIL AND COMMENTS
    // ========================================================================

    /// Fetch one item through the comment node cache, so a story opened from
    /// the list and its comments share entries.
    pub async fn load_story(&self, id: ItemId) -> LanternResult<Option<Item>> {
        let threads = Arc::clone(&self.threads);
        let options = QueryOptions::new().with_stale_time(self.settings.comment_stale);
        let read = self
            .comments
            .cache()
            .fetch(
                id,
                move |id| async move { threads.fetch_node(id).await },
                &options,
            )
            .await?;
        Ok(read.and_then(QueryRead::into_value))
    }

    pub async fn load_comments(&self, kids: &[ItemId]) -> ResolvedTree<Item> {
        self.comments.resolve_tree(kids).await
    }

    /// Comment tree as far as it has resolved.
    pub fn comment_snapshot(&self, kids: &[ItemId]) -> ResolvedTree<Item> {
        self.comments.snapshot(kids)
    }

    // ========================================================================
    // WEATHER
    // ========================================================================

    pub fn weather_configured(&self) -> bool {
        self.weather.is_some()
    }

    fn weather_services(&self) -> LanternResult<&WeatherServices> {
        self.weather.as_ref().ok_or_else(|| {
            ValidationError::RequiredFieldMissing {
                field: "weather_api_key".to_string(),
            }
            .into()
        })
    }

    /// Resolve a city to coordinates. Results are cached per query string for
    /// the life of the app.
    pub async fn resolve_city(&self, city: &str) -> LanternResult<Coordinates> {
        let resolver = Arc::clone(&self.weather_services()?.resolver);
        let read = self
            .coordinates
            .fetch(
                normalize_city(city),
                move |query| async move { resolver.resolve(&query).await },
                &QueryOptions::new(),
            )
            .await?;
        read.map(QueryRead::into_value).ok_or_else(|| {
            QueryError::PrerequisiteMissing {
                name: "coordinates".to_string(),
            }
            .into()
        })
    }

    /// The forecast query is disabled until coordinates resolve.
    fn forecast_options(&self, coordinates: Option<&Coordinates>) -> QueryOptions {
        QueryOptions::new()
            .enabled(coordinates.is_some() && self.weather.is_some())
            .with_stale_time(self.settings.weather_stale)
            .with_refetch_interval(self.settings.weather_poll)
    }

    /// Keep the forecast for `coordinates` loaded and polled. Must be called
    /// from within the tokio runtime.
    pub fn observe_forecast(
        &self,
        coordinates: Coordinates,
    ) -> LanternResult<QueryObserver<Forecast>> {
        let provider = Arc::clone(&self.weather_services()?.provider);
        let options = self.forecast_options(Some(&coordinates));
        debug!(?coordinates, "observing forecast");
        self.forecasts.observe(
            coordinates.cache_key(),
            move |_| {
                let provider = Arc::clone(&provider);
                async move { provider.fetch_forecast(coordinates).await }
            },
            options,
        )
    }

    /// Forecast state for coordinates that may not have resolved yet.
    pub fn forecast_state(
        &self,
        coordinates: Option<&Coordinates>,
    ) -> LanternResult<QueryState<Forecast>> {
        match coordinates {
            Some(c) if self.forecast_options(coordinates).enabled => {
                self.forecasts.state(&c.cache_key())
            }
            _ => Ok(QueryState::default()),
        }
    }

    pub async fn refresh_forecast(&self, coordinates: Coordinates) -> LanternResult<Forecast> {
        let provider = Arc::clone(&self.weather_services()?.provider);
        self.forecasts
            .refetch(coordinates.cache_key(), move |_| async move {
                provider.fetch_forecast(coordinates).await
            })
            .await
            .map(QueryRead::into_value)
    }

    // ========================================================================
    // COUNTER
    // ========================================================================

    pub async fn read_counter(&self) -> LanternResult<CounterState> {
        let store = Arc::clone(&self.counter_store);
        let read = self
            .counter
            .fetch(
                (),
                move |_| async move { store.read_state().await },
                &QueryOptions::new(),
            )
            .await?;
        read.map(QueryRead::into_value).ok_or_else(|| {
            QueryError::PrerequisiteMissing {
                name: "counter".to_string(),
            }
            .into()
        })
    }

    /// Apply a delta, then invalidate and re-read the counter.
    pub async fn apply_delta(&self, delta: i64) -> LanternResult<CounterState> {
        self.counter_store.apply_delta(delta).await?;
        self.counter.invalidate(&())?;
        self.read_counter().await
    }

    pub async fn set_step(&self, step: i64) -> LanternResult<CounterState> {
        self.counter_store.set_step(step).await?;
        self.counter.invalidate(&())?;
        self.read_counter().await
    }

    pub async fn refresh_counter(&self) -> LanternResult<CounterState> {
        self.counter.invalidate(&())?;
        self.read_counter().await
    }
}
