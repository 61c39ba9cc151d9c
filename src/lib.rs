//! Aurora monitoring service.
//!
//! Pulls NOAA SWPC solar wind and K-index data plus local cloud cover, and
//! turns them into a geomagnetic severity level, an aurora viewing advisory,
//! a storm outlook from the Kp forecast, and the current moon phase.
//!
//! The classification modules (`alert`, `moon`, `gauge`) are pure and take
//! time as a parameter. Network access lives in `ingest`, composition in
//! `dashboard`, and periodic refresh in `scheduler`.

pub mod alert;
pub mod config;
pub mod dashboard;
pub mod gauge;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod moon;
pub mod scheduler;
pub mod verify;

pub use alert::{advise, chance_tonight, classify, find_next_storm, AdvisoryMessage, SeverityLevel, StormChance};
pub use model::{KpSample, LocalWeather, Measurement, SpaceWeatherError};
pub use moon::{moon_phase, MoonPhase, MoonPhaseName};
