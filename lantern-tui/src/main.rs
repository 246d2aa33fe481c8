//! Lantern TUI entry point.

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lantern_providers::{HackerNewsClient, OpenWeatherClient};
use lantern_tui::api_client::CounterClient;
use lantern_tui::config::TuiConfig;
use lantern_tui::error::TuiError;
use lantern_tui::events::TuiEvent;
use lantern_tui::queries::{Collaborators, Queries, QuerySettings, WeatherServices};
use lantern_tui::state::App;
use lantern_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "lantern_tui=debug,lantern_query=debug,lantern_providers=debug,info";

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    init_logging(&config.log_path)?;

    let collaborators = build_collaborators(&config)?;
    let queries = Arc::new(Queries::new(
        collaborators,
        QuerySettings::from_config(&config),
    ));

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let tick_rate = config.tick_interval();
    let mut app = App::new(config, queries, event_tx.clone());

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx);
    app.start();
    info!("lantern tui started");

    let mut ticker = tokio::time::interval(tick_rate);
    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => app.on_tick(),
            Some(event) = event_rx.recv() => {
                if app.handle_event(event) {
                    break;
                }
            }
        }
    }

    info!("lantern tui exiting");
    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<(), TuiError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok(())
}

fn build_collaborators(config: &TuiConfig) -> Result<Collaborators, TuiError> {
    let timeout = config.request_timeout();
    let stories = HackerNewsClient::new(config.story_api_base_url.clone(), timeout)?
        .with_max_top_stories(config.max_stories);

    let weather = match &config.weather_api_key {
        Some(key) => {
            let client = Arc::new(OpenWeatherClient::new(
                config.weather_api_base_url.clone(),
                key.clone(),
                timeout,
            )?);
            Some(WeatherServices {
                resolver: client.clone(),
                provider: client,
            })
        }
        None => None,
    };

    let counter = CounterClient::new(&config.counter_api_url, timeout)?;

    Ok(Collaborators {
        stories: Arc::new(stories),
        weather,
        counter: Arc::new(counter),
    })
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            let event = match event::read() {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    TuiEvent::Input(key)
                }
                Ok(CrosstermEvent::Resize(width, height)) => TuiEvent::Resize { width, height },
                _ => continue,
            };
            if sender.blocking_send(event).is_err() {
                break;
            }
        }
    });
}
