//! Classification of space-weather readings into user-facing alerts.
//!
//! Submodules:
//! - `severity`     — Kp to severity level, color and icon (single table).
//! - `advisory`     — aurora viewing advice from Kp and cloud cover.
//! - `forecast`     — next-storm scan over the 3-hour Kp forecast.
//! - `stalenesses`  — detection of old solar wind rows.
//!
//! All functions here are pure and take wall-clock time as a parameter.

pub mod advisory;
pub mod forecast;
pub mod severity;
pub mod stalenesses;

pub use advisory::{advise, AdvisoryMessage};
pub use forecast::{chance_tonight, find_next_storm, StormChance};
pub use severity::{classify, SeverityLevel};
