/// Core data types for the aurora monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O, only types, their validation, and the crate error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Measurement types
// ---------------------------------------------------------------------------

/// One combined reading of current space-weather conditions.
///
/// Assembled from the latest rows of the SWPC plasma, magnetometer and
/// planetary K-index feeds. `timestamp` is the plasma row's time tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub k_index: f64,
    pub solar_wind_speed_km_s: f64,
    pub proton_density_cm3: f64,
    /// IMF Z-component (GSM), signed. Negative favors geomagnetic coupling.
    pub magnetic_field_z_nt: f64,
}

impl Measurement {
    /// Rejects any non-finite field. The first offending field is named in
    /// the error.
    pub fn validate(&self) -> Result<(), SpaceWeatherError> {
        let fields = [
            ("k_index", self.k_index),
            ("solar_wind_speed_km_s", self.solar_wind_speed_km_s),
            ("proton_density_cm3", self.proton_density_cm3),
            ("magnetic_field_z_nt", self.magnetic_field_z_nt),
        ];
        for (field, value) in fields {
            ensure_finite(field, value)?;
        }
        Ok(())
    }
}

/// A single entry of the 3-hour planetary K-index forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpSample {
    pub timestamp: DateTime<Utc>,
    pub k_index: f64,
    /// `true` for rows SWPC marks as "observed", `false` for estimated/predicted.
    pub observed: bool,
}

/// Local conditions at the configured observing location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalWeather {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub wind_speed_km_h: f64,
    pub cloud_cover_percent: f64,
}

/// Returns `InvalidMeasurement` if `value` is NaN or infinite.
pub fn ensure_finite(field: &str, value: f64) -> Result<f64, SpaceWeatherError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SpaceWeatherError::InvalidMeasurement {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when acquiring or classifying space-weather data.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceWeatherError {
    /// A numeric input was NaN or infinite. Never coerced to zero.
    InvalidMeasurement { field: String, value: String },
    /// Non-2xx HTTP response from a data feed.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    RequestFailed(String),
    /// The response body could not be deserialized or a field was malformed.
    ParseError(String),
    /// The feed responded but held no usable rows.
    NoDataAvailable(String),
    /// The newest reading is older than the configured freshness threshold.
    StaleData { feed: String, age_minutes: i64 },
    /// Configuration file missing, malformed, or out of range.
    ConfigError(String),
}

impl std::fmt::Display for SpaceWeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpaceWeatherError::InvalidMeasurement { field, value } => {
                write!(f, "Invalid measurement: {} = {}", field, value)
            }
            SpaceWeatherError::HttpError(code) => write!(f, "HTTP error: {}", code),
            SpaceWeatherError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            SpaceWeatherError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SpaceWeatherError::NoDataAvailable(feed) => write!(f, "No data available from {}", feed),
            SpaceWeatherError::StaleData { feed, age_minutes } => {
                write!(f, "Stale data from {}: {} minutes old", feed, age_minutes)
            }
            SpaceWeatherError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for SpaceWeatherError {}

impl From<reqwest::Error> for SpaceWeatherError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SpaceWeatherError::HttpError(status.as_u16()),
            None if err.is_decode() => SpaceWeatherError::ParseError(err.to_string()),
            None => SpaceWeatherError::RequestFailed(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SpaceWeatherError {
    fn from(err: serde_json::Error) -> Self {
        SpaceWeatherError::ParseError(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
