//! Lantern Providers - HTTP Collaborators
//!
//! reqwest-backed implementations of the core collaborator traits:
//! [`HackerNewsClient`] for `StoryApi` and [`OpenWeatherClient`] for
//! `CoordinatesResolver` and `WeatherProvider`. Wire types are validated into
//! core payloads here; malformed responses surface as `ValidationError`.

mod http;

pub mod hacker_news;
pub mod open_weather;

pub use hacker_news::HackerNewsClient;
pub use open_weather::OpenWeatherClient;
