//! Geomagnetic severity classification from the planetary K-index.
//!
//! There is exactly one KP-to-level table in the crate, `SEVERITY_TABLE`.
//! Every call site that needs a label, color or icon goes through
//! `classify` and the accessors on `SeverityLevel`.
//!
//! Canonical scheme (lower bound inclusive, upper bound exclusive):
//!
//! | Kp        | Level         | Color     |
//! |-----------|---------------|-----------|
//! | < 3       | Quiet         | green     |
//! | 3 .. 5    | Active        | yellow    |
//! | 5 .. 6    | MinorStorm    | orange    |
//! | 6 .. 7    | ModerateStorm | red       |
//! | 7 .. 8    | StrongStorm   | dark red  |
//! | >= 8      | SevereStorm   | deep red  |
//!
//! Values outside 0..9 are not rejected: anything below 0 is Quiet, anything
//! above 9 is SevereStorm.

use serde::{Deserialize, Serialize};

use crate::model::{ensure_finite, SpaceWeatherError};

/// Geomagnetic severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    Quiet,
    Active,
    MinorStorm,
    ModerateStorm,
    StrongStorm,
    SevereStorm,
}

/// One row of the severity table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityBand {
    pub lower_bound: f64,
    pub level: SeverityLevel,
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

/// Ordered by ascending `lower_bound`. The first row's bound is never
/// consulted; it only documents where the scale starts.
pub static SEVERITY_TABLE: &[SeverityBand] = &[
    SeverityBand {
        lower_bound: 0.0,
        level: SeverityLevel::Quiet,
        label: "Quiet",
        color: "#22c55e",
        icon: "🟢",
    },
    SeverityBand {
        lower_bound: 3.0,
        level: SeverityLevel::Active,
        label: "Active",
        color: "#eab308",
        icon: "🟡",
    },
    SeverityBand {
        lower_bound: 5.0,
        level: SeverityLevel::MinorStorm,
        label: "Minor Storm",
        color: "#f97316",
        icon: "🟠",
    },
    SeverityBand {
        lower_bound: 6.0,
        level: SeverityLevel::ModerateStorm,
        label: "Moderate Storm",
        color: "#ef4444",
        icon: "🔴",
    },
    SeverityBand {
        lower_bound: 7.0,
        level: SeverityLevel::StrongStorm,
        label: "Strong Storm",
        color: "#dc2626",
        icon: "🚨",
    },
    SeverityBand {
        lower_bound: 8.0,
        level: SeverityLevel::SevereStorm,
        label: "Severe Storm",
        color: "#991b1b",
        icon: "🌌",
    },
];

/// Looks up the table row for a finite K-index.
fn band_for(k_index: f64) -> &'static SeverityBand {
    SEVERITY_TABLE
        .iter()
        .rev()
        .find(|band| k_index >= band.lower_bound)
        .unwrap_or(&SEVERITY_TABLE[0])
}

/// Maps a planetary K-index to its severity level.
///
/// Returns `InvalidMeasurement` for NaN or infinite input.
pub fn classify(k_index: f64) -> Result<SeverityLevel, SpaceWeatherError> {
    let k_index = ensure_finite("k_index", k_index)?;
    Ok(band_for(k_index).level)
}

impl SeverityLevel {
    fn band(&self) -> &'static SeverityBand {
        SEVERITY_TABLE
            .iter()
            .find(|band| band.level == *self)
            .unwrap_or(&SEVERITY_TABLE[0])
    }

    pub fn label(&self) -> &'static str {
        self.band().label
    }

    /// Display color as a CSS hex string.
    pub fn color(&self) -> &'static str {
        self.band().color
    }

    pub fn icon(&self) -> &'static str {
        self.band().icon
    }

    /// Inclusive K-index lower bound of this level.
    pub fn lower_bound(&self) -> f64 {
        self.band().lower_bound
    }

    /// True from MinorStorm (Kp 5, NOAA G1) upwards.
    pub fn is_storm(&self) -> bool {
        *self >= SeverityLevel::MinorStorm
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
