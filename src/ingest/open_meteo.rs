/// Open-Meteo forecast client
///
/// Retrieves current temperature and wind plus hourly cloud cover for the
/// configured observing location. Cloud cover feeds the aurora advisory.
///
/// API Documentation: https://open-meteo.com/en/docs

use chrono::{DateTime, Timelike, Utc};
use serde::Deserialize;

use crate::config::LocationConfig;
use crate::ingest::swpc::parse_time_tag;
use crate::model::{LocalWeather, SpaceWeatherError};

pub const FEED_WEATHER: &str = "open-meteo";

// ============================================================================
// Open-Meteo Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: CurrentWeather,
    pub hourly: Option<Hourly>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
    pub time: String, // ISO 8601 without offset, UTC by default
    pub temperature: f64,
    pub windspeed: f64,
}

#[derive(Debug, Deserialize)]
pub struct Hourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub cloudcover: Vec<Option<f64>>,
}

impl Hourly {
    /// Cloud cover for the hour containing `current`, or the first hourly
    /// value when no entry carries that hour.
    pub fn cloud_cover_at(&self, current: DateTime<Utc>) -> Option<f64> {
        let hour = current
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))?;

        let matching = self
            .time
            .iter()
            .position(|tag| parse_time_tag(tag).is_ok_and(|t| t == hour))
            .and_then(|i| self.cloudcover.get(i).copied().flatten());

        matching.or_else(|| self.cloudcover.first().copied().flatten())
    }
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the forecast URL for a location.
pub fn build_forecast_url(base_url: &str, location: &LocationConfig) -> String {
    format!(
        "{}?latitude={:.2}&longitude={:.2}&current_weather=true&hourly=cloudcover",
        base_url, location.latitude, location.longitude
    )
}

/// Parses a forecast response body into `LocalWeather`.
///
/// Cloud cover is the hourly value for the hour of `current_weather.time`.
/// A response without any cloud cover is `NoDataAvailable`.
pub fn parse_forecast(body: &str) -> Result<LocalWeather, SpaceWeatherError> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    let timestamp = parse_time_tag(&response.current_weather.time)?;

    let cloud_cover_percent = response
        .hourly
        .as_ref()
        .and_then(|h| h.cloud_cover_at(timestamp))
        .ok_or_else(|| SpaceWeatherError::NoDataAvailable(FEED_WEATHER.to_string()))?;

    Ok(LocalWeather {
        timestamp,
        temperature_c: response.current_weather.temperature,
        wind_speed_km_h: response.current_weather.windspeed,
        cloud_cover_percent,
    })
}

/// Fetch current local weather for the configured location
pub fn fetch_weather(
    client: &reqwest::blocking::Client,
    base_url: &str,
    location: &LocationConfig,
) -> Result<LocalWeather, SpaceWeatherError> {
    let url = build_forecast_url(base_url, location);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(SpaceWeatherError::HttpError(response.status().as_u16()));
    }

    parse_forecast(&response.text()?)
}

// ============================================================================
// Tests
// ============================================================================
