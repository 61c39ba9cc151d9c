/// Service configuration loaded from `aurora.toml`.
///
/// Every section has defaults, so an empty file (or no file at all, via
/// `Config::default()`) gives a working setup pointed at the public NOAA SWPC
/// and Open-Meteo endpoints. Values from `.env` / the process environment
/// override the file:
///
/// - `AURORA_LATITUDE`, `AURORA_LONGITUDE` — observing location
/// - `AURORA_LOG_FILE` — append log entries to this path

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::logging::LogLevel;
use crate::model::SpaceWeatherError;

pub const DEFAULT_CONFIG_PATH: &str = "./aurora.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: LocationConfig,
    pub refresh: RefreshConfig,
    pub feeds: FeedConfig,
    pub logging: LoggingConfig,
    pub advisory: AdvisoryConfig,
}

/// Observing location used for the local weather lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "Tromsø".to_string(),
            latitude: 69.65,
            longitude: 18.96,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Solar wind / Kp / weather refresh.
    pub current_interval_secs: u64,
    /// Moon phase refresh.
    pub moon_interval_secs: u64,
    /// Solar wind rows older than this are reported as stale.
    pub max_measurement_age_minutes: i64,
    pub http_timeout_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            current_interval_secs: 60,
            moon_interval_secs: 3600,
            max_measurement_age_minutes: 30,
            http_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub plasma_url: String,
    pub mag_url: String,
    pub kp_url: String,
    pub kp_forecast_url: String,
    pub weather_base_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            plasma_url: "https://services.swpc.noaa.gov/products/solar-wind/plasma-1-day.json"
                .to_string(),
            mag_url: "https://services.swpc.noaa.gov/products/solar-wind/mag-1-day.json"
                .to_string(),
            kp_url: "https://services.swpc.noaa.gov/json/planetary_k_index_1m.json".to_string(),
            kp_forecast_url:
                "https://services.swpc.noaa.gov/products/noaa-planetary-k-index-forecast.json"
                    .to_string(),
            weather_base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Cloud cover assumed when local weather is unavailable.
    pub default_cloud_cover_percent: f64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            default_cloud_cover_percent: 50.0,
        }
    }
}

impl Config {
    /// Parses a TOML document. Environment overrides are not applied here.
    pub fn from_toml_str(text: &str) -> Result<Config, SpaceWeatherError> {
        let config: Config =
            toml::from_str(text).map_err(|e| SpaceWeatherError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), SpaceWeatherError> {
        let loc = &self.location;
        if !(-90.0..=90.0).contains(&loc.latitude) {
            return Err(SpaceWeatherError::ConfigError(format!(
                "latitude {} outside -90..90",
                loc.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(SpaceWeatherError::ConfigError(format!(
                "longitude {} outside -180..180",
                loc.longitude
            )));
        }
        if self.refresh.current_interval_secs == 0 || self.refresh.moon_interval_secs == 0 {
            return Err(SpaceWeatherError::ConfigError(
                "refresh intervals must be non-zero".to_string(),
            ));
        }
        if !self.advisory.default_cloud_cover_percent.is_finite() {
            return Err(SpaceWeatherError::ConfigError(
                "default_cloud_cover_percent must be a number".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies `AURORA_*` overrides from a lookup function.
    ///
    /// Takes the lookup as a parameter so tests don't touch the process
    /// environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SpaceWeatherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(lat) = lookup("AURORA_LATITUDE") {
            self.location.latitude = parse_coordinate("AURORA_LATITUDE", &lat)?;
        }
        if let Some(lon) = lookup("AURORA_LONGITUDE") {
            self.location.longitude = parse_coordinate("AURORA_LONGITUDE", &lon)?;
        }
        if let Some(file) = lookup("AURORA_LOG_FILE") {
            self.logging.file = Some(file);
        }
        self.validate()
    }
}

fn parse_coordinate(key: &str, raw: &str) -> Result<f64, SpaceWeatherError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SpaceWeatherError::ConfigError(format!("{} is not a number: '{}'", key, raw)))
}

/// Loads the config file at `path`, then `.env` and environment overrides.
///
/// A missing file is not an error; defaults are used instead.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, SpaceWeatherError> {
    dotenv::dotenv().ok();

    let path = path.as_ref();
    let mut config = if path.exists() {
        let text = fs::read_to_string(path).map_err(|e| {
            SpaceWeatherError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Config::from_toml_str(&text)?
    } else {
        Config::default()
    };

    config.apply_overrides(|key| env::var(key).ok())?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = Config::from_toml_str("").expect("empty TOML should parse");
        assert_eq!(config.refresh.current_interval_secs, 60);
        assert_eq!(config.refresh.moon_interval_secs, 3600);
        assert_eq!(config.advisory.default_cloud_cover_percent, 50.0);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.feeds.plasma_url.contains("plasma-1-day.json"));
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [location]
            name = "Fairbanks"
            latitude = 64.84
            longitude = -147.72

            [logging]
            level = "debug"
            "#,
        )
        .expect("valid config should parse");
        assert_eq!(config.location.name, "Fairbanks");
        assert_eq!(config.location.longitude, -147.72);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.refresh.current_interval_secs, 60);
    }

    #[test]
    fn test_out_of_range_latitude_is_rejected() {
        let result = Config::from_toml_str("[location]\nlatitude = 95.0\n");
        assert!(matches!(result, Err(SpaceWeatherError::ConfigError(_))));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = Config::from_toml_str("[refresh]\ncurrent_interval_secs = 0\n");
        assert!(result.is_err(), "zero interval would spin the scheduler");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = Config::from_toml_str("[location\nlatitude = ");
        assert!(matches!(result, Err(SpaceWeatherError::ConfigError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [
            ("AURORA_LATITUDE", "60.17"),
            ("AURORA_LONGITUDE", "24.94"),
            ("AURORA_LOG_FILE", "/tmp/aurora.log"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .expect("overrides are valid");
        assert_eq!(config.location.latitude, 60.17);
        assert_eq!(config.location.longitude, 24.94);
        assert_eq!(config.logging.file.as_deref(), Some("/tmp/aurora.log"));
    }

    #[test]
    fn test_non_numeric_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "AURORA_LATITUDE").then(|| "north".to_string())
        });
        assert!(result.is_err());
    }
}
