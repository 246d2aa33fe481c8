//! OpenWeather geocoding and One Call client

use std::time::Duration;

use async_trait::async_trait;
use lantern_core::{
    Coordinates, CoordinatesResolver, Forecast, LanternResult, NotFoundError, ValidationError,
    WeatherProvider,
};
use tracing::debug;

use super::types::{GeoMatch, OneCallResponse};
use crate::http::JsonClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeather client. Resolves cities and fetches imperial-unit forecasts.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: JsonClient,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> LanternResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "weather_api_key".to_string(),
            }
            .into());
        }
        Ok(Self {
            http: JsonClient::new(base_url, timeout)?,
            api_key,
        })
    }
}

#[async_trait]
impl CoordinatesResolver for OpenWeatherClient {
    async fn resolve(&self, city: &str) -> LanternResult<Coordinates> {
        let query = [
            ("q", city.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];
        let matches: Vec<GeoMatch> = self.http.get_json("geo/1.0/direct", &query).await?;

        let Some(found) = matches.into_iter().next() else {
            return Err(NotFoundError::City {
                query: city.to_string(),
            }
            .into());
        };
        debug!(city, name = %found.name, "city resolved");
        Ok(Coordinates::new(found.lat, found.lon)?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_forecast(&self, coordinates: Coordinates) -> LanternResult<Forecast> {
        let query = [
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
            ("exclude", "alerts".to_string()),
            ("units", "imperial".to_string()),
            ("appid", self.api_key.clone()),
        ];
        let raw: OneCallResponse = self.http.get_json("data/3.0/onecall", &query).await?;
        Ok(Forecast::try_from(raw)?)
    }
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.http.base_url())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
