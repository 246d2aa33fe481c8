//! OpenWeather collaborators
//!
//! City geocoding and the One Call forecast (alerts excluded, imperial units).

pub mod client;
pub mod types;

pub use client::{OpenWeatherClient, DEFAULT_BASE_URL};
