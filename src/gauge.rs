//! Gauge values and colors for the solar wind panel.
//!
//! A gauge fills proportionally to `|value| / max` and shifts hue from
//! green (120°) to red (0°) as it fills. Reversed gauges (Bz) stay green for
//! positive values and only redden as the field turns southward.

use serde::Serialize;

use crate::model::Measurement;

pub const WIND_SPEED_MAX_KM_S: f64 = 800.0;
pub const DENSITY_MAX_CM3: f64 = 20.0;
pub const BZ_MAX_NT: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub label: &'static str,
    pub unit: &'static str,
    pub value: f64,
    pub max: f64,
    pub reverse: bool,
}

impl Gauge {
    /// Filled share of the gauge in [0, 1]. A non-positive `max` reads as full.
    pub fn ratio(&self) -> f64 {
        if self.max <= 0.0 {
            return 1.0;
        }
        (self.value.abs() / self.max).min(1.0)
    }

    /// HSL hue in degrees, 120 = green, 0 = red.
    pub fn hue(&self) -> f64 {
        let scaled = 120.0 - self.ratio() * 120.0;
        if self.reverse && self.value >= 0.0 {
            120.0
        } else {
            scaled
        }
    }

    pub fn color(&self) -> String {
        format!("hsl({}, 80%, 50%)", self.hue().round())
    }
}

impl std::fmt::Display for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<12} {:>7.1} {:<5} [{}]",
            self.label,
            self.value,
            self.unit,
            bar(self.ratio(), 20)
        )
    }
}

fn bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

/// The three solar wind gauges for a measurement: speed, density, Bz.
pub fn gauges_for(measurement: &Measurement) -> Vec<Gauge> {
    vec![
        Gauge {
            label: "Wind speed",
            unit: "km/s",
            value: measurement.solar_wind_speed_km_s,
            max: WIND_SPEED_MAX_KM_S,
            reverse: false,
        },
        Gauge {
            label: "Density",
            unit: "p/cm3",
            value: measurement.proton_density_cm3,
            max: DENSITY_MAX_CM3,
            reverse: false,
        },
        Gauge {
            label: "Bz",
            unit: "nT",
            value: measurement.magnetic_field_z_nt,
            max: BZ_MAX_NT,
            reverse: true,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
