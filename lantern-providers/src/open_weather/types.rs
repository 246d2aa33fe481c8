//! OpenWeather geocoding and One Call wire types

use lantern_core::{
    timestamp_from_unix, Coordinates, DailyForecast, Forecast, HourlyForecast,
    MinutelyPrecipitation, ValidationError,
};
use serde::Deserialize;

// ============================================================================
// GEOCODING
// ============================================================================

/// One match from `/geo/1.0/direct`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

// ============================================================================
// ONE CALL
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallResponse {
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
    pub current: Option<RawCurrent>,
    pub minutely: Option<Vec<RawMinutely>>,
    #[serde(default)]
    pub hourly: Vec<RawHourly>,
    #[serde(default)]
    pub daily: Vec<RawDaily>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrent {
    pub temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMinutely {
    pub dt: i64,
    pub precipitation: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHourly {
    pub dt: i64,
    pub temp: f64,
    #[serde(default)]
    pub pop: f64,
    pub rain: Option<RawRainVolume>,
}

/// Hourly precipitation volume, keyed `"1h"` on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRainVolume {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDaily {
    pub dt: i64,
    pub temp: RawDailyTemp,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    pub rain: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDailyTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl TryFrom<OneCallResponse> for Forecast {
    type Error = ValidationError;

    fn try_from(raw: OneCallResponse) -> Result<Self, Self::Error> {
        let coordinates = Coordinates::new(raw.lat, raw.lon)?;

        let minutely = raw
            .minutely
            .map(|minutes| {
                minutes
                    .into_iter()
                    .map(|m| {
                        Ok(MinutelyPrecipitation {
                            dt: timestamp_from_unix(m.dt)?,
                            precipitation: m.precipitation,
                        })
                    })
                    .collect::<Result<Vec<_>, ValidationError>>()
            })
            .transpose()?;

        let hourly = raw
            .hourly
            .into_iter()
            .map(|h| {
                Ok(HourlyForecast {
                    dt: timestamp_from_unix(h.dt)?,
                    temp: h.temp,
                    pop: h.pop,
                    rain_1h: h.rain.and_then(|r| r.one_hour),
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let daily = raw
            .daily
            .into_iter()
            .map(|d| {
                let condition = d.weather.into_iter().next();
                Ok(DailyForecast {
                    dt: timestamp_from_unix(d.dt)?,
                    temp_min: d.temp.min,
                    temp_max: d.temp.max,
                    summary: condition
                        .as_ref()
                        .map(|c| c.main.clone())
                        .unwrap_or_default(),
                    description: condition
                        .as_ref()
                        .map(|c| c.description.clone())
                        .unwrap_or_default(),
                    icon: condition.map(|c| c.icon).unwrap_or_default(),
                    rain: d.rain,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Forecast {
            coordinates,
            timezone: raw.timezone,
            current_temp: raw.current.map(|c| c.temp),
            minutely,
            hourly,
            daily,
        })
    }
}
