//! Weather payloads

use serde::{Deserialize, Serialize};

use crate::{Timestamp, ValidationError};

/// A resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting values outside the valid ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::InvalidValue {
                field: "lat".to_string(),
                reason: format!("{} is outside [-90, 90]", lat),
            });
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::InvalidValue {
                field: "lon".to_string(),
                reason: format!("{} is outside [-180, 180]", lon),
            });
        }
        Ok(Self { lat, lon })
    }

    /// Hashable cache key: coordinates rounded to 1e-4 degrees.
    pub fn cache_key(&self) -> (i64, i64) {
        (
            (self.lat * 10_000.0).round() as i64,
            (self.lon * 10_000.0).round() as i64,
        )
    }
}

/// One day of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub dt: Timestamp,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Short condition group, e.g. "Rain".
    pub summary: String,
    pub description: String,
    pub icon: String,
    /// Precipitation volume, when reported.
    pub rain: Option<f64>,
}

/// One hour of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub dt: Timestamp,
    pub temp: f64,
    /// Probability of precipitation, 0.0 to 1.0.
    pub pop: f64,
    pub rain_1h: Option<f64>,
}

/// Precipitation for one minute of the next hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinutelyPrecipitation {
    pub dt: Timestamp,
    pub precipitation: f64,
}

/// Forecast for a location as returned by the weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub coordinates: Coordinates,
    pub timezone: String,
    pub current_temp: Option<f64>,
    /// Only present where the provider has minute-level data.
    pub minutely: Option<Vec<MinutelyPrecipitation>>,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

impl Forecast {
    /// The days shown in the weekly summary.
    pub fn week(&self) -> &[DailyForecast] {
        &self.daily[..self.daily.len().min(7)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(33.749, -84.388).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -181.0).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinates_cache_key_rounds() {
        let a = Coordinates::new(33.74901, -84.38799).unwrap();
        let b = Coordinates::new(33.749, -84.388).unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }
}
