//! Dashboard flows driven through key events against mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use lantern_core::{CounterState, CounterStore, ItemId};
use lantern_storage::InMemoryCounterStore;
use lantern_test_utils::{fixtures, MockCoordinatesResolver, MockStoryApi, MockWeatherProvider};
use lantern_tui::config::{ConfigError, TuiConfig};
use lantern_tui::events::TuiEvent;
use lantern_tui::keys::{map_key, Action};
use lantern_tui::nav::View;
use lantern_tui::queries::{Collaborators, Queries, QuerySettings, WeatherServices};
use lantern_tui::state::{
    App, StoryStatus, INVALID_STORY_ID, LOCATION_NOT_FOUND, WEATHER_NOT_CONFIGURED,
};
use lantern_tui::views::render_view;
use lantern_tui::widgets::UNAVAILABLE_PLACEHOLDER;
use proptest::prelude::*;
use ratatui::{backend::TestBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::timeout;

// ============================================================================
// HELPERS
// ============================================================================

const BASE_TOML: &str = r#"
story_api_base_url = "http://stories.test"
weather_api_base_url = "http://weather.test"
counter_api_url = "http://counter.test"
request_timeout_ms = 5000
tick_interval_ms = 250
log_path = "tmp/lantern-tui.log"
"#;

fn base_config() -> TuiConfig {
    TuiConfig::from_toml(BASE_TOML).unwrap()
}

fn config_with(extra: &str) -> Result<TuiConfig, ConfigError> {
    TuiConfig::from_toml(&format!("{BASE_TOML}\n{extra}"))
}

struct Harness {
    app: App,
    events: mpsc::Receiver<TuiEvent>,
}

impl Harness {
    fn new(
        stories: Arc<MockStoryApi>,
        weather: Option<WeatherServices>,
        counter: Arc<dyn CounterStore>,
    ) -> Self {
        let queries = Queries::new(
            Collaborators {
                stories,
                weather,
                counter,
            },
            QuerySettings::default(),
        );
        let (tx, events) = mpsc::channel(64);
        let app = App::new(base_config(), Arc::new(queries), tx);
        Self { app, events }
    }

    fn stories_only(stories: Arc<MockStoryApi>) -> Self {
        Self::new(stories, None, Arc::new(InMemoryCounterStore::new()))
    }

    /// Apply the next `count` background results.
    async fn settle(&mut self, count: usize) {
        for _ in 0..count {
            let event = timeout(Duration::from_secs(5), self.events.recv())
                .await
                .expect("timed out waiting for a fetch")
                .expect("event channel closed");
            self.app.handle_event(event);
        }
    }

    fn assert_idle(&mut self) {
        assert!(
            self.events.try_recv().is_err(),
            "unexpected background fetch"
        );
    }

    fn press(&mut self, code: KeyCode) -> bool {
        self.app
            .handle_event(TuiEvent::Input(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    fn render(&self) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 48)).unwrap();
        terminal.draw(|f| render_view(f, &self.app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn weather_services() -> (WeatherServices, Arc<MockWeatherProvider>) {
    let provider = Arc::new(MockWeatherProvider::new());
    let services = WeatherServices {
        resolver: Arc::new(
            MockCoordinatesResolver::new()
                .with_city("Atlanta", fixtures::atlanta())
                .with_city("New York", fixtures::new_york()),
        ),
        provider: provider.clone(),
    };
    (services, provider)
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn config_defaults_apply() {
    let config = base_config();
    assert!(config.validate().is_ok());
    assert_eq!(config.page_size, 10);
    assert_eq!(config.max_stories, 500);
    assert_eq!(config.default_city, "Atlanta");
    assert_eq!(config.weather_api_key, None);
    assert_eq!(config.weather_poll_interval(), Duration::from_secs(60));
    assert_eq!(config.comment_stale_time(), Duration::from_secs(300));
}

#[test]
fn config_rejects_zero_page_size() {
    let config = config_with("page_size = 0").unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue {
            field: "page_size",
            ..
        })
    ));
}

#[test]
fn config_rejects_blank_weather_key() {
    let config = config_with(r#"weather_api_key = "  ""#).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue {
            field: "weather_api_key",
            ..
        })
    ));
}

#[test]
fn config_rejects_unknown_fields() {
    assert!(matches!(
        config_with("theme = \"dark\""),
        Err(ConfigError::Parse(_))
    ));
}

// ============================================================================
// KEYS
// ============================================================================

proptest! {
    #[test]
    fn keybinding_digit_switches_view(digit in 0u8..=9u8) {
        let ch = char::from(b'0' + digit);
        let event = KeyEvent {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        };
        let expected = match ch {
            '1' => Some(Action::SwitchView(0)),
            '2' => Some(Action::SwitchView(1)),
            '3' => Some(Action::SwitchView(2)),
            _ => None,
        };
        prop_assert_eq!(map_key(event), expected);
    }
}

#[test]
fn control_c_quits() {
    let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(map_key(event), Some(Action::Quit));
    let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
    assert_eq!(map_key(plain), Some(Action::EditCity));
}

// ============================================================================
// STORIES
// ============================================================================

#[tokio::test]
async fn stories_load_one_page_per_request() {
    let api = Arc::new(fixtures::front_page(25));
    let mut h = Harness::stories_only(api.clone());

    h.app.start();
    h.settle(2).await;
    assert_eq!(h.app.story_items().len(), 10);
    assert!(h.app.stories.error.is_none());

    h.press(KeyCode::Char('m'));
    h.settle(1).await;
    assert_eq!(h.app.story_items().len(), 20);

    h.press(KeyCode::Char('m'));
    h.settle(1).await;
    let ids: Vec<u64> = h.app.story_items().iter().map(|s| s.id.as_u64()).collect();
    assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    assert_eq!(api.list_calls(), 1);

    h.press(KeyCode::Char('m'));
    h.assert_idle();
    assert_eq!(
        h.app.notifications.last().map(|n| n.message.as_str()),
        Some("Nothing more to load")
    );
    assert!(h.render().contains("Nothing more to load"));
}

#[tokio::test]
async fn selection_stays_within_loaded_stories() {
    let mut h = Harness::stories_only(Arc::new(fixtures::front_page(3)));
    h.app.start();
    h.settle(2).await;

    for _ in 0..5 {
        h.press(KeyCode::Down);
    }
    assert_eq!(h.app.stories.selected, 2);
    h.press(KeyCode::Up);
    assert_eq!(h.app.stories.selected, 1);
}

#[tokio::test]
async fn failed_id_list_shows_error() {
    let mut h = Harness::stories_only(Arc::new(MockStoryApi::new().failing_list()));
    h.app.start();
    h.settle(2).await;

    assert!(h.app.stories.error.is_some());
    assert!(h.app.story_items().is_empty());
    assert!(h.render().contains("Error:"));
}

// ============================================================================
// STORY DETAIL
// ============================================================================

#[tokio::test]
async fn story_detail_renders_comment_tree() {
    let api = Arc::new(fixtures::small_thread());
    let mut h = Harness::stories_only(api.clone());
    h.app.start();
    h.settle(2).await;

    h.press(KeyCode::Enter);
    // story, then its comments
    h.settle(2).await;

    let detail = h.app.detail.as_ref().expect("detail open");
    assert_eq!(detail.id, Some(ItemId::new(42)));
    assert!(detail.comments_settled);
    let story = detail.story().expect("story loaded");
    assert_eq!(story.title, "Story 42");

    let tree = h.app.queries.comment_snapshot(&story.kids);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.unavailable_count(), 1);
    for id in [43, 44, 45, 100] {
        assert_eq!(api.item_calls(ItemId::new(id)), 1);
    }

    let screen = h.render();
    assert!(screen.contains("Story 42"));
    assert!(screen.contains("user43"));
    assert!(screen.contains("Comment 45"));
    assert!(screen.contains(UNAVAILABLE_PLACEHOLDER));

    h.press(KeyCode::Esc);
    assert!(h.app.detail.is_none());
}

#[tokio::test]
async fn reopening_a_story_reuses_cached_comments() {
    let api = Arc::new(fixtures::small_thread());
    let mut h = Harness::stories_only(api.clone());
    h.app.start();
    h.settle(2).await;

    h.press(KeyCode::Enter);
    h.settle(2).await;
    h.press(KeyCode::Esc);
    h.press(KeyCode::Enter);
    h.settle(2).await;

    assert!(h.app.detail.as_ref().is_some_and(|d| d.comments_settled));
    assert_eq!(api.item_calls(ItemId::new(44)), 1);
    assert_eq!(api.item_calls(ItemId::new(45)), 1);
}

#[tokio::test]
async fn story_route_from_command_line() {
    let api = Arc::new(fixtures::small_thread());
    let mut h = Harness::stories_only(api);
    h.app.start();
    h.settle(2).await;

    h.press(KeyCode::Char('3'));
    h.press(KeyCode::Char(':'));
    h.type_text("/story/42");
    h.press(KeyCode::Enter);
    h.settle(2).await;

    assert_eq!(h.app.active_view, View::Stories);
    assert!(h
        .app
        .detail
        .as_ref()
        .is_some_and(|d| d.story().is_some()));
}

#[tokio::test]
async fn invalid_story_id_is_not_fetched() {
    let api = Arc::new(fixtures::small_thread());
    let mut h = Harness::stories_only(api.clone());
    h.app.start();
    h.settle(2).await;
    let calls_before = api.total_item_calls();

    h.press(KeyCode::Char(':'));
    h.type_text("story/abc");
    h.press(KeyCode::Enter);

    h.assert_idle();
    assert_eq!(api.total_item_calls(), calls_before);
    assert!(matches!(
        h.app.detail.as_ref().map(|d| &d.status),
        Some(StoryStatus::InvalidId(raw)) if raw == "abc"
    ));
    assert!(h.render().contains(INVALID_STORY_ID));
}

#[tokio::test]
async fn missing_story_is_reported() {
    let mut h = Harness::stories_only(Arc::new(MockStoryApi::new()));
    h.app.start();
    h.settle(2).await;

    h.press(KeyCode::Char(':'));
    h.type_text("story/8863");
    h.press(KeyCode::Enter);
    h.settle(1).await;

    assert!(matches!(
        h.app.detail.as_ref().map(|d| &d.status),
        Some(StoryStatus::NotFound)
    ));
}

#[tokio::test]
async fn unknown_route_warns() {
    let mut h = Harness::stories_only(Arc::new(MockStoryApi::new()));
    h.press(KeyCode::Char(':'));
    h.type_text("login");
    h.press(KeyCode::Enter);

    h.assert_idle();
    assert!(h.app.prompt.is_none());
    assert_eq!(
        h.app.notifications.last().map(|n| n.message.as_str()),
        Some("Unknown route: login")
    );
}

// ============================================================================
// WEATHER
// ============================================================================

async fn wait_for_forecast(h: &mut Harness) {
    let result = timeout(Duration::from_secs(5), async {
        while h.app.weather.forecast_state().data.is_none() {
            let Some(observer) = h.app.weather.forecast.as_mut() else {
                return;
            };
            if !observer.changed().await {
                return;
            }
        }
    })
    .await;
    assert!(result.is_ok(), "forecast never resolved");
}

#[tokio::test]
async fn weather_resolves_default_city_and_forecast() {
    let (services, provider) = weather_services();
    let mut h = Harness::new(
        Arc::new(MockStoryApi::new()),
        Some(services),
        Arc::new(InMemoryCounterStore::new()),
    );
    h.app.start();
    // page, counter, coordinates
    h.settle(3).await;

    assert_eq!(h.app.weather.city, "Atlanta");
    assert_eq!(h.app.weather.coordinates, Some(fixtures::atlanta()));
    assert!(h.app.weather.forecast.is_none());
    assert_eq!(provider.calls(), 0);

    h.press(KeyCode::Char('2'));
    wait_for_forecast(&mut h).await;

    let forecast = h.app.weather.forecast_state().data.unwrap();
    assert_eq!(forecast.current_temp, Some(1.0));
    assert_eq!(forecast.week().len(), 7);
    assert_eq!(provider.calls(), 1);

    let screen = h.render();
    assert!(screen.contains("Weather: Atlanta"));
    assert!(screen.contains("7-day forecast"));
    assert!(screen.contains("Chance of rain"));
}

#[tokio::test]
async fn forecast_is_only_observed_while_weather_view_shows() {
    let (services, provider) = weather_services();
    let mut h = Harness::new(
        Arc::new(MockStoryApi::new()),
        Some(services),
        Arc::new(InMemoryCounterStore::new()),
    );
    h.app.start();
    h.settle(3).await;

    h.press(KeyCode::Char('2'));
    wait_for_forecast(&mut h).await;
    assert_eq!(provider.calls(), 1);

    h.press(KeyCode::Char('3'));
    assert_eq!(h.app.active_view, View::Counter);
    assert!(h.app.weather.forecast.is_none());

    // Back within the stale window: served from cache, polling resumes.
    h.press(KeyCode::Char('2'));
    assert!(h.app.weather.forecast.is_some());
    wait_for_forecast(&mut h).await;
    assert_eq!(h.app.weather.forecast_state().data.unwrap().current_temp, Some(1.0));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn unknown_city_shows_location_not_found() {
    let (services, _) = weather_services();
    let mut h = Harness::new(
        Arc::new(MockStoryApi::new()),
        Some(services),
        Arc::new(InMemoryCounterStore::new()),
    );
    h.app.start();
    h.settle(3).await;

    h.press(KeyCode::Char('2'));
    h.press(KeyCode::Char('c'));
    for _ in 0.."Atlanta".len() {
        h.press(KeyCode::Backspace);
    }
    h.type_text("Atlantis");
    h.press(KeyCode::Enter);
    h.settle(1).await;

    assert_eq!(h.app.weather.city, "Atlantis");
    assert_eq!(h.app.weather.error.as_deref(), Some(LOCATION_NOT_FOUND));
    assert!(h.app.weather.forecast.is_none());
    assert!(h.render().contains(LOCATION_NOT_FOUND));
}

#[tokio::test]
async fn empty_city_falls_back_to_new_york() {
    let (services, _) = weather_services();
    let mut h = Harness::new(
        Arc::new(MockStoryApi::new()),
        Some(services),
        Arc::new(InMemoryCounterStore::new()),
    );
    h.app.start();
    h.settle(3).await;

    h.press(KeyCode::Char('2'));
    h.press(KeyCode::Char('c'));
    for _ in 0.."Atlanta".len() {
        h.press(KeyCode::Backspace);
    }
    h.press(KeyCode::Enter);
    h.settle(1).await;

    assert_eq!(h.app.weather.city, "New York");
    assert_eq!(h.app.weather.coordinates, Some(fixtures::new_york()));
}

#[tokio::test]
async fn weather_without_key_is_not_fetched() {
    let mut h = Harness::stories_only(Arc::new(MockStoryApi::new()));
    h.app.start();
    h.settle(2).await;
    h.assert_idle();

    assert_eq!(h.app.weather.error.as_deref(), Some(WEATHER_NOT_CONFIGURED));
    h.press(KeyCode::Char('2'));
    assert!(h.render().contains("Weather is not configured"));
}

// ============================================================================
// COUNTER
// ============================================================================

#[tokio::test]
async fn counter_applies_step_and_clamps_it() {
    let store = Arc::new(InMemoryCounterStore::new());
    let mut h = Harness::new(Arc::new(MockStoryApi::new()), None, store.clone());
    h.app.start();
    h.settle(2).await;
    assert_eq!(h.app.counter.state, Some(CounterState::default()));

    h.press(KeyCode::Char('3'));
    h.press(KeyCode::Char('+'));
    h.settle(1).await;
    assert_eq!(h.app.counter.state.map(|s| s.count), Some(1));

    h.press(KeyCode::Char(']'));
    h.settle(1).await;
    h.press(KeyCode::Char('+'));
    h.settle(1).await;
    assert_eq!(
        h.app.counter.state,
        Some(CounterState { count: 3, step: 2 })
    );

    h.press(KeyCode::Char('-'));
    h.settle(1).await;
    h.press(KeyCode::Char('['));
    h.settle(1).await;
    h.press(KeyCode::Char('['));
    h.assert_idle();

    let persisted = store.read_state().await.unwrap();
    assert_eq!(persisted, CounterState { count: 1, step: 1 });
    assert_eq!(h.app.counter.state, Some(persisted));

    let screen = h.render();
    assert!(screen.contains("Count: 1"));
    assert!(screen.contains("Step: 1"));
}

#[tokio::test]
async fn counter_keys_ignored_outside_counter_view() {
    let store = Arc::new(InMemoryCounterStore::new());
    let mut h = Harness::new(Arc::new(MockStoryApi::new()), None, store.clone());
    h.app.start();
    h.settle(2).await;

    h.press(KeyCode::Char('+'));
    h.assert_idle();
    assert_eq!(store.read_state().await.unwrap().count, 0);
}

#[tokio::test]
async fn counter_rejects_step_below_one() {
    let store = Arc::new(InMemoryCounterStore::with_state(CounterState {
        count: 7,
        step: 3,
    }));
    let h = Harness::new(Arc::new(MockStoryApi::new()), None, store.clone());

    assert!(h.app.queries.set_step(0).await.is_err());
    assert_eq!(
        h.app.queries.apply_delta(-2).await.unwrap(),
        CounterState { count: 5, step: 3 }
    );
}

#[tokio::test]
async fn quit_key_ends_the_loop() {
    let mut h = Harness::stories_only(Arc::new(MockStoryApi::new()));
    assert!(!h.press(KeyCode::Tab));
    assert_eq!(h.app.active_view, View::Weather);
    assert!(h.press(KeyCode::Char('q')));
}
