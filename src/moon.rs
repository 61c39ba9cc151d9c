//! Lunar phase approximation.
//!
//! Uses a fixed reference new moon (1970-01-07 20:35 UTC) and the mean
//! synodic month of 2,551,443 s. Elapsed time is reduced modulo the period in
//! integer milliseconds, which keeps the result exactly periodic and maps
//! instants before the epoch into the same [0, 1) cycle.
//!
//! Phase cut points (fraction of the cycle, upper bound exclusive):
//!
//! | fraction       | phase            |
//! |----------------|------------------|
//! | < 0.03         | New Moon         |
//! | 0.03 .. 0.25   | Waxing Crescent  |
//! | 0.25 .. 0.27   | First Quarter    |
//! | 0.27 .. 0.47   | Waxing Gibbous   |
//! | 0.47 .. 0.53   | Full Moon        |
//! | 0.53 .. 0.75   | Waning Gibbous   |
//! | 0.75 .. 0.77   | Last Quarter     |
//! | 0.77 ..= 0.97  | Waning Crescent  |
//! | > 0.97         | New Moon         |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean synodic month in seconds (29.53059 days).
pub const SYNODIC_MONTH_SECS: i64 = 2_551_443;

const SYNODIC_MONTH_MS: i64 = SYNODIC_MONTH_SECS * 1000;

/// A known new moon used as phase zero.
pub fn reference_new_moon() -> DateTime<Utc> {
    DateTime::from_timestamp(REFERENCE_NEW_MOON_UNIX, 0).unwrap_or_default()
}

/// 1970-01-07T20:35:00Z as Unix seconds.
const REFERENCE_NEW_MOON_UNIX: i64 = 6 * 86_400 + 20 * 3_600 + 35 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhaseName {
    pub fn label(&self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "New Moon",
            MoonPhaseName::WaxingCrescent => "Waxing Crescent",
            MoonPhaseName::FirstQuarter => "First Quarter",
            MoonPhaseName::WaxingGibbous => "Waxing Gibbous",
            MoonPhaseName::FullMoon => "Full Moon",
            MoonPhaseName::WaningGibbous => "Waning Gibbous",
            MoonPhaseName::LastQuarter => "Last Quarter",
            MoonPhaseName::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "🌑",
            MoonPhaseName::WaxingCrescent => "🌒",
            MoonPhaseName::FirstQuarter => "🌓",
            MoonPhaseName::WaxingGibbous => "🌔",
            MoonPhaseName::FullMoon => "🌕",
            MoonPhaseName::WaningGibbous => "🌖",
            MoonPhaseName::LastQuarter => "🌗",
            MoonPhaseName::WaningCrescent => "🌘",
        }
    }

    /// Buckets a cycle fraction in [0, 1).
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction < 0.03 || fraction > 0.97 {
            MoonPhaseName::NewMoon
        } else if fraction < 0.25 {
            MoonPhaseName::WaxingCrescent
        } else if fraction < 0.27 {
            MoonPhaseName::FirstQuarter
        } else if fraction < 0.47 {
            MoonPhaseName::WaxingGibbous
        } else if fraction < 0.53 {
            MoonPhaseName::FullMoon
        } else if fraction < 0.75 {
            MoonPhaseName::WaningGibbous
        } else if fraction < 0.77 {
            MoonPhaseName::LastQuarter
        } else {
            MoonPhaseName::WaningCrescent
        }
    }
}

impl std::fmt::Display for MoonPhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    pub name: MoonPhaseName,
    /// Position in the synodic cycle, 0 = new, 0.5 = full.
    pub fraction: f64,
    /// Lit share of the disc, rounded to the nearest 0.5.
    pub illumination_percent: f64,
}

impl std::fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} — {}% illuminated",
            self.name.icon(),
            self.name.label(),
            self.illumination_percent
        )
    }
}

/// Fraction of the synodic cycle elapsed at `instant`, in [0, 1).
pub fn cycle_fraction(instant: DateTime<Utc>) -> f64 {
    let elapsed_ms = (instant - reference_new_moon()).num_milliseconds();
    elapsed_ms.rem_euclid(SYNODIC_MONTH_MS) as f64 / SYNODIC_MONTH_MS as f64
}

/// Illuminated percentage for a cycle fraction, rounded to the nearest 0.5.
pub fn illumination_percent(fraction: f64) -> f64 {
    let raw = (1.0 - (fraction * std::f64::consts::TAU).cos()) * 50.0;
    (raw * 2.0).round() / 2.0
}

/// Lunar phase at `instant`.
pub fn moon_phase(instant: DateTime<Utc>) -> MoonPhase {
    let fraction = cycle_fraction(instant);
    MoonPhase {
        name: MoonPhaseName::from_fraction(fraction),
        fraction,
        illumination_percent: illumination_percent(fraction),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
