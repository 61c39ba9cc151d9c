/// Dashboard snapshot: everything the aurora panel shows, in one value.
///
/// `build_snapshot` is pure. It takes each feed's result and turns failures
/// into "data unavailable" notes rather than zero readings.
/// `fetch_snapshot` does the network work and logs failures on the way.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::alert::forecast::{chance_tonight, find_next_storm, upcoming, StormChance};
use crate::alert::stalenesses::ensure_row_fresh;
use crate::alert::{advise, classify, AdvisoryMessage, SeverityLevel};
use crate::config::Config;
use crate::gauge::{gauges_for, Gauge};
use crate::ingest::swpc::{MagSample, PlasmaSample};
use crate::ingest::{open_meteo, swpc};
use crate::logging::{self, DataSource};
use crate::model::{KpSample, LocalWeather, Measurement, SpaceWeatherError};
use crate::moon::{moon_phase, MoonPhase};

/// Number of 3-hour slots in the forecast table (three days).
pub const FORECAST_TABLE_SLOTS: usize = 24;

const BZ_SOUTHWARD_COLOR: &str = "#ef4444";
const BZ_NORTHWARD_COLOR: &str = "#22c55e";

/// A feed that could not be used for this snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unavailable {
    pub feed: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub location: String,
    pub measurement: Option<Measurement>,
    pub severity: Option<SeverityLevel>,
    pub gauges: Vec<Gauge>,
    pub weather: Option<LocalWeather>,
    /// Cloud cover the advisory was computed with (measured or fallback).
    pub cloud_cover_used_percent: f64,
    pub advisory: Option<AdvisoryMessage>,
    pub next_storm: Option<KpSample>,
    pub storm_chance: Option<StormChance>,
    pub forecast: Vec<ForecastRow>,
    pub moon: MoonPhase,
    pub unavailable: Vec<Unavailable>,
}

/// One 3-hour slot of the forecast table. Level, color and icon come from
/// the severity table; the solar wind columns repeat the current reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub timestamp: DateTime<Utc>,
    pub k_index: f64,
    pub observed: bool,
    pub level: SeverityLevel,
    pub color: &'static str,
    pub icon: &'static str,
    pub solar_wind_speed_km_s: Option<f64>,
    pub proton_density_cm3: Option<f64>,
    pub bz_nt: Option<f64>,
    /// Red while Bz points south (negative), green otherwise.
    pub bz_color: Option<&'static str>,
}

/// Builds the forecast table from the slots that have not yet ended.
pub fn forecast_rows(
    series: &[KpSample],
    now: DateTime<Utc>,
    current: Option<&Measurement>,
) -> Vec<ForecastRow> {
    let bz_nt = current.map(|m| m.magnetic_field_z_nt);
    upcoming(series, now)
        .iter()
        .take(FORECAST_TABLE_SLOTS)
        .filter_map(|sample| {
            let level = classify(sample.k_index).ok()?;
            Some(ForecastRow {
                timestamp: sample.timestamp,
                k_index: sample.k_index,
                observed: sample.observed,
                level,
                color: level.color(),
                icon: level.icon(),
                solar_wind_speed_km_s: current.map(|m| m.solar_wind_speed_km_s),
                proton_density_cm3: current.map(|m| m.proton_density_cm3),
                bz_nt,
                bz_color: bz_nt.map(|bz| if bz < 0.0 { BZ_SOUTHWARD_COLOR } else { BZ_NORTHWARD_COLOR }),
            })
        })
        .collect()
}

/// Combines the current plasma, magnetometer and Kp rows once each has
/// passed the freshness check.
pub fn fresh_measurement(
    plasma: &PlasmaSample,
    mag: &MagSample,
    kp: &KpSample,
    max_age_minutes: i64,
    now: DateTime<Utc>,
) -> Result<Measurement, SpaceWeatherError> {
    ensure_row_fresh(plasma.timestamp, swpc::FEED_PLASMA, max_age_minutes, now)?;
    ensure_row_fresh(mag.timestamp, swpc::FEED_MAG, max_age_minutes, now)?;
    ensure_row_fresh(kp.timestamp, swpc::FEED_KP, max_age_minutes, now)?;
    swpc::combine(plasma, mag, kp)
}

/// Inputs to `build_snapshot`, one result per feed group.
pub struct FeedResults {
    pub measurement: Result<Measurement, SpaceWeatherError>,
    pub weather: Result<LocalWeather, SpaceWeatherError>,
    pub forecast: Result<Vec<KpSample>, SpaceWeatherError>,
}

pub fn build_snapshot(
    now: DateTime<Utc>,
    location: &str,
    results: FeedResults,
    default_cloud_cover_percent: f64,
) -> Snapshot {
    let mut unavailable = Vec::new();
    let mut note = |feed: &str, err: &SpaceWeatherError| {
        unavailable.push(Unavailable {
            feed: feed.to_string(),
            reason: err.to_string(),
        });
    };

    let measurement = match results.measurement {
        Ok(m) => Some(m),
        Err(e) => {
            note("solar-wind", &e);
            None
        }
    };

    let weather = match results.weather {
        Ok(w) => Some(w),
        Err(e) => {
            note(open_meteo::FEED_WEATHER, &e);
            None
        }
    };

    let (next_storm, storm_chance, forecast) = match results.forecast {
        Ok(series) => {
            let next = find_next_storm(upcoming(&series, now)).cloned();
            let chance = chance_tonight(next.as_ref());
            let rows = forecast_rows(&series, now, measurement.as_ref());
            (next, Some(chance), rows)
        }
        Err(e) => {
            note(swpc::FEED_KP_FORECAST, &e);
            (None, None, Vec::new())
        }
    };

    let cloud_cover_used_percent = weather
        .as_ref()
        .map(|w| w.cloud_cover_percent)
        .unwrap_or(default_cloud_cover_percent);

    // Measurements are validated at ingest, so classification cannot fail here.
    let severity = measurement.as_ref().and_then(|m| classify(m.k_index).ok());
    let advisory = measurement
        .as_ref()
        .and_then(|m| advise(m.k_index, cloud_cover_used_percent).ok());
    let gauges = measurement.as_ref().map(gauges_for).unwrap_or_default();

    Snapshot {
        generated_at: now,
        location: location.to_string(),
        measurement,
        severity,
        gauges,
        weather,
        cloud_cover_used_percent,
        advisory,
        next_storm,
        storm_chance,
        forecast,
        moon: moon_phase(now),
        unavailable,
    }
}

/// Fetches all feeds and builds a snapshot. Never fails as a whole; each
/// failed feed is logged and listed in `Snapshot::unavailable`.
pub fn fetch_snapshot(
    client: &reqwest::blocking::Client,
    config: &Config,
    now: DateTime<Utc>,
) -> Snapshot {
    let measurement = fetch_current(client, config, now);
    if let Err(e) = &measurement {
        logging::log_feed_failure(DataSource::Swpc, "solar-wind", "fetch current conditions", e);
    }

    let weather = open_meteo::fetch_weather(client, &config.feeds.weather_base_url, &config.location);
    if let Err(e) = &weather {
        logging::log_feed_failure(DataSource::OpenMeteo, open_meteo::FEED_WEATHER, "fetch weather", e);
    }

    let forecast = swpc::fetch_kp_forecast(client, &config.feeds);
    if let Err(e) = &forecast {
        logging::log_feed_failure(DataSource::Swpc, swpc::FEED_KP_FORECAST, "fetch Kp forecast", e);
    }

    let total = 3;
    let failed = [measurement.is_err(), weather.is_err(), forecast.is_err()]
        .iter()
        .filter(|failed| **failed)
        .count();
    logging::log_refresh_summary(total, total - failed, failed);

    build_snapshot(
        now,
        &config.location.name,
        FeedResults { measurement, weather, forecast },
        config.advisory.default_cloud_cover_percent,
    )
}

fn fetch_current(
    client: &reqwest::blocking::Client,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Measurement, SpaceWeatherError> {
    let plasma = swpc::fetch_plasma(client, &config.feeds)?;
    let mag = swpc::fetch_mag(client, &config.feeds)?;
    let kp = swpc::fetch_current_kp(client, &config.feeds)?;
    fresh_measurement(&plasma, &mag, &kp, config.refresh.max_measurement_age_minutes, now)
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Aurora conditions for {} at {}",
            self.location,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )?;

        match (&self.measurement, self.severity) {
            (Some(m), Some(level)) => {
                writeln!(f, "{} Kp {:.1} — {}", level.icon(), m.k_index, level.label())?;
                for gauge in &self.gauges {
                    writeln!(f, "  {}", gauge)?;
                }
            }
            _ => writeln!(f, "Solar wind data unavailable.")?,
        }

        match &self.weather {
            Some(w) => writeln!(
                f,
                "📍 {} | 🌡️ {}°C | ☁️ {}% clouds | 💨 {} km/h",
                self.location, w.temperature_c, w.cloud_cover_percent, w.wind_speed_km_h
            )?,
            None => writeln!(f, "Weather data unavailable.")?,
        }

        if let Some(advisory) = &self.advisory {
            writeln!(f, "{}", advisory)?;
        }

        match (&self.next_storm, self.storm_chance) {
            (Some(storm), Some(chance)) => writeln!(
                f,
                "Next storm: Kp {:.1} at {} (chance tonight: {})",
                storm.k_index,
                storm.timestamp.format("%a %H:%M UTC"),
                chance
            )?,
            (None, Some(chance)) => {
                writeln!(f, "No storm in the forecast (chance tonight: {})", chance)?
            }
            _ => writeln!(f, "Kp forecast unavailable.")?,
        }

        if !self.forecast.is_empty() {
            writeln!(f, "3-day forecast (UTC):")?;
            for row in &self.forecast {
                let bz = row.bz_nt.map(|bz| format!("{:.1}", bz)).unwrap_or_else(|| "-".to_string());
                writeln!(
                    f,
                    "  {}  Kp {:.1}  {} {:<14}  Bz {}",
                    row.timestamp.format("%a %d %b %H:%M"),
                    row.k_index,
                    row.icon,
                    row.level.label(),
                    bz
                )?;
            }
        }

        write!(f, "{}", self.moon)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
