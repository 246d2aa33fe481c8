//! Application state and view state definitions.
//!
//! All fetching happens on spawned tasks. Each task reports back with a
//! [`Fetched`] event, and [`App::handle_event`] folds it into view state.
//! Views read the query caches directly when drawing.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use crossterm::event::KeyEvent;
use lantern_core::{
    Coordinates, CounterState, Forecast, Item, ItemId, LanternError, LanternResult, Story,
    ValidationError,
};
use lantern_query::{PageFetch, QueryObserver, QueryState};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::TuiConfig;
use crate::events::{Fetched, TuiEvent};
use crate::keys::{map_input_key, map_key, Action, InputKey};
use crate::nav::{Route, View};
use crate::notifications::{Notification, NotificationLevel};
use crate::queries::{normalize_city, Queries};
use crate::theme::LanternTheme;

pub const INVALID_STORY_ID: &str = "Invalid Story ID";
pub const LOCATION_NOT_FOUND: &str = "Location not found.";
pub const WEATHER_FAILED: &str = "Could not fetch weather.";
pub const WEATHER_NOT_CONFIGURED: &str = "Weather is not configured. Set weather_api_key.";

const NOTIFICATION_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, Default)]
pub struct StoriesViewState {
    pub selected: usize,
    /// A "load more" has been requested and not reported back yet.
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoryStatus {
    /// The route did not carry a numeric id; nothing is fetched.
    InvalidId(String),
    Loading,
    Loaded(Story),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct StoryDetailState {
    pub id: Option<ItemId>,
    pub status: StoryStatus,
    pub scroll: u16,
    /// Every comment under the story has resolved or degraded.
    pub comments_settled: bool,
}

impl StoryDetailState {
    fn loading(id: ItemId) -> Self {
        Self {
            id: Some(id),
            status: StoryStatus::Loading,
            scroll: 0,
            comments_settled: false,
        }
    }

    fn invalid(raw: String) -> Self {
        Self {
            id: None,
            status: StoryStatus::InvalidId(raw),
            scroll: 0,
            comments_settled: true,
        }
    }

    pub fn story(&self) -> Option<&Story> {
        match &self.status {
            StoryStatus::Loaded(story) => Some(story),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct WeatherViewState {
    pub city: String,
    pub coordinates: Option<Coordinates>,
    pub resolving: bool,
    pub error: Option<String>,
    /// Keeps the forecast loaded and polled while set.
    pub forecast: Option<QueryObserver<Forecast>>,
}

impl WeatherViewState {
    pub fn forecast_state(&self) -> QueryState<Forecast> {
        self.forecast
            .as_ref()
            .map(QueryObserver::current)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CounterViewState {
    pub state: Option<CounterState>,
    /// A read or mutation is in flight.
    pub busy: bool,
    pub error: Option<String>,
}

impl CounterViewState {
    pub fn step(&self) -> i64 {
        self.state.map_or(CounterState::DEFAULT_STEP, |s| s.step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    City,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn label(&self) -> &'static str {
        match self.kind {
            PromptKind::City => "City",
            PromptKind::Command => "Go to",
        }
    }
}

pub struct App {
    pub config: TuiConfig,
    pub theme: LanternTheme,
    pub queries: Arc<Queries>,
    pub active_view: View,

    pub stories: StoriesViewState,
    pub detail: Option<StoryDetailState>,
    pub weather: WeatherViewState,
    pub counter: CounterViewState,

    pub prompt: Option<Prompt>,
    pub notifications: Vec<Notification>,

    events: mpsc::Sender<TuiEvent>,
}

impl App {
    pub fn new(config: TuiConfig, queries: Arc<Queries>, events: mpsc::Sender<TuiEvent>) -> Self {
        let city = config.default_city.clone();
        Self {
            config,
            theme: LanternTheme::lantern(),
            queries,
            active_view: View::Stories,
            stories: StoriesViewState::default(),
            detail: None,
            weather: WeatherViewState {
                city,
                ..WeatherViewState::default()
            },
            counter: CounterViewState::default(),
            prompt: None,
            notifications: Vec::new(),
            events,
        }
    }

    /// Kick off the first page, the counter read and the default city.
    pub fn start(&mut self) {
        self.load_more();
        self.refresh_counter();
        let city = self.weather.city.clone();
        self.set_city(&city);
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    /// Run `task` in the background and feed its result back as an event.
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Fetched> + Send + 'static,
    {
        let sender = self.events.clone();
        tokio::spawn(async move {
            let fetched = task.await;
            if sender.send(TuiEvent::Fetched(fetched)).await.is_err() {
                debug!("event loop closed before fetch completed");
            }
        });
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    /// Returns `true` when the app should exit.
    pub fn handle_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Input(key) => return self.handle_key(key),
            TuiEvent::Fetched(fetched) => self.apply(fetched),
            TuiEvent::Tick => self.on_tick(),
            TuiEvent::Resize { .. } => {}
        }
        false
    }

    pub fn on_tick(&mut self) {
        let now = Utc::now();
        let ttl = chrono::Duration::seconds(NOTIFICATION_TTL_SECS);
        self.notifications.retain(|n| !n.is_expired(now, ttl));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.prompt.is_some() {
            if let Some(input) = map_input_key(key) {
                self.handle_prompt_key(input);
            }
            return false;
        }
        match map_key(key) {
            Some(action) => self.handle_action(action),
            None => false,
        }
    }

    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::NextView => self.switch_view(self.active_view.next()),
            Action::PrevView => self.switch_view(self.active_view.previous()),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.switch_view(view);
                }
            }
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::Confirm => self.open_selected(),
            Action::Back => {
                if self.active_view == View::Stories {
                    self.detail = None;
                }
            }
            Action::LoadMore => {
                if self.active_view == View::Stories && self.detail.is_none() {
                    self.load_more();
                }
            }
            Action::Refresh => self.refresh(),
            Action::Increment if self.active_view == View::Counter => {
                self.apply_delta(self.counter.step());
            }
            Action::Decrement if self.active_view == View::Counter => {
                self.apply_delta(-self.counter.step());
            }
            Action::StepUp if self.active_view == View::Counter => {
                self.set_step(self.counter.step().saturating_add(1));
            }
            Action::StepDown if self.active_view == View::Counter => {
                let step = self.counter.step();
                let lowered = (step - 1).max(CounterState::DEFAULT_STEP);
                if lowered != step {
                    self.set_step(lowered);
                }
            }
            Action::EditCity if self.active_view == View::Weather => {
                self.prompt = Some(Prompt {
                    kind: PromptKind::City,
                    input: self.weather.city.clone(),
                });
            }
            Action::OpenCommand => {
                self.prompt = Some(Prompt {
                    kind: PromptKind::Command,
                    input: String::new(),
                });
            }
            Action::Increment
            | Action::Decrement
            | Action::StepUp
            | Action::StepDown
            | Action::EditCity => {}
        }
        false
    }

    fn handle_prompt_key(&mut self, key: InputKey) {
        match key {
            InputKey::Char(c) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.push(c);
                }
            }
            InputKey::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.pop();
                }
            }
            InputKey::Cancel => self.prompt = None,
            InputKey::Submit => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        match prompt.kind {
            PromptKind::City => self.set_city(&prompt.input),
            PromptKind::Command => match Route::parse(&prompt.input) {
                Some(route) => self.open_route(route),
                None => self.notify(
                    NotificationLevel::Warning,
                    format!("Unknown route: {}", prompt.input.trim()),
                ),
            },
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// Forecast polling only runs while the weather view is showing.
    fn switch_view(&mut self, view: View) {
        self.active_view = view;
        if view == View::Weather {
            self.observe_forecast();
        } else if self.weather.forecast.take().is_some() {
            debug!("weather view hidden, forecast polling stopped");
        }
    }

    fn observe_forecast(&mut self) {
        if self.weather.forecast.is_some() {
            return;
        }
        let Some(coordinates) = self.weather.coordinates else {
            return;
        };
        match self.queries.observe_forecast(coordinates) {
            Ok(observer) => self.weather.forecast = Some(observer),
            Err(err) => self.weather.error = Some(weather_error_message(&err)),
        }
    }

    pub fn open_route(&mut self, route: Route) {
        self.switch_view(route.view());
        match route {
            Route::Stories => self.detail = None,
            Route::Story(id) => self.open_story(id),
            Route::InvalidStory(raw) => {
                debug!(raw = %raw, "story route without a numeric id");
                self.detail = Some(StoryDetailState::invalid(raw));
            }
            Route::Weather | Route::Counter => {}
        }
    }

    /// Stories loaded so far, in page order.
    pub fn story_items(&self) -> Vec<Story> {
        self.queries.stories().items().unwrap_or_default()
    }

    fn move_selection(&mut self, delta: i64) {
        if self.active_view != View::Stories {
            return;
        }
        if let Some(detail) = self.detail.as_mut() {
            detail.scroll = if delta < 0 {
                detail.scroll.saturating_sub(1)
            } else {
                detail.scroll.saturating_add(1)
            };
            return;
        }

        let len = self.story_items().len();
        if len == 0 {
            return;
        }
        let selected = self.stories.selected;
        self.stories.selected = if delta < 0 {
            selected.saturating_sub(1)
        } else {
            (selected + 1).min(len - 1)
        };
    }

    fn open_selected(&mut self) {
        if self.active_view != View::Stories || self.detail.is_some() {
            return;
        }
        if let Some(story) = self.story_items().get(self.stories.selected) {
            let id = story.id;
            self.open_story(id);
        }
    }

    pub fn open_story(&mut self, id: ItemId) {
        self.switch_view(View::Stories);
        self.detail = Some(StoryDetailState::loading(id));
        let queries = Arc::clone(&self.queries);
        self.spawn(async move {
            let result = queries.load_story(id).await;
            Fetched::Story { id, result }
        });
    }

    fn load_comments(&self, story: &Story) {
        let queries = Arc::clone(&self.queries);
        let id = story.id;
        let kids = story.kids.clone();
        self.spawn(async move {
            let tree = queries.load_comments(&kids).await;
            debug!(
                story = %id,
                nodes = tree.len(),
                unavailable = tree.unavailable_count(),
                "comments settled"
            );
            Fetched::Comments { story: id }
        });
    }

    // ========================================================================
    // DATA
    // ========================================================================

    pub fn load_more(&mut self) {
        match self.queries.stories().has_next_page() {
            Ok(false) => {
                self.notify(NotificationLevel::Info, "Nothing more to load");
                return;
            }
            Ok(true) => {}
            Err(err) => warn!(error = %err, "could not read page state"),
        }
        if self.stories.loading || self.queries.stories().is_fetching_next_page() {
            return;
        }
        self.stories.loading = true;
        let queries = Arc::clone(&self.queries);
        self.spawn(async move {
            let result = queries.load_next_page().await.map(|fetch| {
                if let PageFetch::Loaded(page) = fetch {
                    debug!(page = page.page_index, items = page.items.len(), "page loaded");
                }
            });
            Fetched::Page(result)
        });
    }

    pub fn set_city(&mut self, city: &str) {
        let city = normalize_city(city);
        self.weather = WeatherViewState {
            city: city.clone(),
            ..WeatherViewState::default()
        };
        if !self.queries.weather_configured() {
            self.weather.error = Some(WEATHER_NOT_CONFIGURED.to_string());
            return;
        }
        self.weather.resolving = true;
        let queries = Arc::clone(&self.queries);
        self.spawn(async move {
            let result = queries.resolve_city(&city).await;
            Fetched::Coordinates { city, result }
        });
    }

    fn refresh_counter(&mut self) {
        self.counter.busy = true;
        let queries = Arc::clone(&self.queries);
        self.spawn(async move { Fetched::Counter(queries.refresh_counter().await) });
    }

    fn apply_delta(&mut self, delta: i64) {
        self.counter.busy = true;
        let queries = Arc::clone(&self.queries);
        self.spawn(async move { Fetched::Counter(queries.apply_delta(delta).await) });
    }

    fn set_step(&mut self, step: i64) {
        self.counter.busy = true;
        let queries = Arc::clone(&self.queries);
        self.spawn(async move { Fetched::Counter(queries.set_step(step).await) });
    }

    fn refresh(&mut self) {
        match self.active_view {
            View::Stories => match self.detail.as_ref().and_then(|d| d.id) {
                Some(id) => self.open_story(id),
                None => {
                    if let Err(err) = self.queries.stories().reset() {
                        warn!(error = %err, "could not reset stories");
                    }
                    self.stories = StoriesViewState::default();
                    self.load_more();
                }
            },
            View::Weather => {
                let Some(coordinates) = self.weather.coordinates else {
                    let city = self.weather.city.clone();
                    self.set_city(&city);
                    return;
                };
                let queries = Arc::clone(&self.queries);
                tokio::spawn(async move {
                    if let Err(err) = queries.refresh_forecast(coordinates).await {
                        warn!(error = %err, "forecast refresh failed");
                    }
                });
            }
            View::Counter => self.refresh_counter(),
        }
    }

    /// Fold a finished fetch into view state.
    pub fn apply(&mut self, fetched: Fetched) {
        match fetched {
            Fetched::Page(result) => {
                self.stories.loading = false;
                match result {
                    Ok(()) => self.stories.error = None,
                    Err(err) => {
                        warn!(error = %err, "page fetch failed");
                        self.stories.error = Some(err.to_string());
                        self.notify(NotificationLevel::Error, "Could not load stories");
                    }
                }
            }
            Fetched::Story { id, result } => self.apply_story(id, result),
            Fetched::Comments { story } => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.id == Some(story)) {
                    detail.comments_settled = true;
                }
            }
            Fetched::Coordinates { city, result } => self.apply_coordinates(city, result),
            Fetched::Counter(result) => {
                self.counter.busy = false;
                match result {
                    Ok(state) => {
                        self.counter.state = Some(state);
                        self.counter.error = None;
                    }
                    Err(err) => {
                        warn!(error = %err, "counter request failed");
                        self.counter.error = Some(err.to_string());
                        self.notify(NotificationLevel::Error, err.to_string());
                    }
                }
            }
        }
    }

    fn apply_story(&mut self, id: ItemId, result: LanternResult<Option<Item>>) {
        let Some(detail) = self.detail.as_mut().filter(|d| d.id == Some(id)) else {
            debug!(story = %id, "dropping result for a closed story");
            return;
        };
        detail.status = match result {
            Ok(Some(item)) => match item.into_story() {
                Some(story) => StoryStatus::Loaded(story),
                None => StoryStatus::NotFound,
            },
            Ok(None) => StoryStatus::NotFound,
            Err(err) if err.is_not_found() => StoryStatus::NotFound,
            Err(err) => StoryStatus::Failed(err.to_string()),
        };

        let with_comments = match &detail.status {
            StoryStatus::Loaded(story) if !story.kids.is_empty() => Some(story.clone()),
            _ => None,
        };
        detail.comments_settled = with_comments.is_none();
        if let Some(story) = with_comments {
            self.load_comments(&story);
        }
    }

    fn apply_coordinates(&mut self, city: String, result: LanternResult<Coordinates>) {
        if city != self.weather.city {
            debug!(city = %city, "dropping coordinates for a replaced city");
            return;
        }
        self.weather.resolving = false;
        match result {
            Ok(coordinates) => {
                self.weather.coordinates = Some(coordinates);
                self.weather.error = None;
                if self.active_view == View::Weather {
                    self.observe_forecast();
                }
            }
            Err(err) => {
                warn!(city = %city, error = %err, "city lookup failed");
                self.weather.error = Some(weather_error_message(&err));
            }
        }
    }
}

/// User-facing text for a failed weather lookup.
pub fn weather_error_message(err: &LanternError) -> String {
    match err {
        LanternError::NotFound(_) => LOCATION_NOT_FOUND.to_string(),
        LanternError::Validation(ValidationError::RequiredFieldMissing { .. }) => {
            WEATHER_NOT_CONFIGURED.to_string()
        }
        _ => WEATHER_FAILED.to_string(),
    }
}
