//! Aurora-visibility advice from geomagnetic activity and cloud cover.
//!
//! Cloud cover is always passed in. Callers without a weather reading pass
//! the configured fallback (`AdvisoryConfig::default_cloud_cover_percent`).

use serde::{Deserialize, Serialize};

use crate::model::{ensure_finite, SpaceWeatherError};

/// Above this cloud cover the sky is considered unusable.
pub const CLOUD_COVER_LIMIT_PERCENT: f64 = 70.0;

/// Kp at or above which viewing chances are "great".
pub const GREAT_CHANCE_KP: f64 = 5.0;

/// Kp at or above which viewing chances are "good".
pub const GOOD_CHANCE_KP: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvisoryMessage {
    TooCloudy,
    GreatChance,
    GoodChance,
    LowActivity,
}

impl AdvisoryMessage {
    pub fn icon(&self) -> &'static str {
        match self {
            AdvisoryMessage::TooCloudy => "☁️",
            AdvisoryMessage::GreatChance => "🌌",
            AdvisoryMessage::GoodChance => "✨",
            AdvisoryMessage::LowActivity => "😴",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            AdvisoryMessage::TooCloudy => "Too cloudy for aurora tonight.",
            AdvisoryMessage::GreatChance => {
                "Strong geomagnetic activity! Great chance to see aurora!"
            }
            AdvisoryMessage::GoodChance => "Today is good to see aurora if there are no clouds.",
            AdvisoryMessage::LowActivity => "Low activity tonight.",
        }
    }
}

impl std::fmt::Display for AdvisoryMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon(), self.text())
    }
}

/// Combines K-index and cloud cover into a viewing recommendation.
///
/// Cloud cover is clamped to 0..=100 first; above 70% the answer is
/// `TooCloudy` whatever the K-index.
pub fn advise(k_index: f64, cloud_cover_percent: f64) -> Result<AdvisoryMessage, SpaceWeatherError> {
    let k_index = ensure_finite("k_index", k_index)?;
    let clouds = ensure_finite("cloud_cover_percent", cloud_cover_percent)?.clamp(0.0, 100.0);

    let message = if clouds > CLOUD_COVER_LIMIT_PERCENT {
        AdvisoryMessage::TooCloudy
    } else if k_index >= GREAT_CHANCE_KP {
        AdvisoryMessage::GreatChance
    } else if k_index >= GOOD_CHANCE_KP {
        AdvisoryMessage::GoodChance
    } else {
        AdvisoryMessage::LowActivity
    };
    Ok(message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clouds_take_precedence_over_activity() {
        assert_eq!(advise(7.0, 80.0).unwrap(), AdvisoryMessage::TooCloudy);
        assert_eq!(advise(9.0, 70.1).unwrap(), AdvisoryMessage::TooCloudy);
    }

    #[test]
    fn test_exactly_seventy_percent_is_not_too_cloudy() {
        // Strictly greater than the limit.
        assert_eq!(advise(5.0, 70.0).unwrap(), AdvisoryMessage::GreatChance);
    }

    #[test]
    fn test_activity_buckets_under_clear_sky() {
        assert_eq!(advise(5.5, 10.0).unwrap(), AdvisoryMessage::GreatChance);
        assert_eq!(advise(3.0, 10.0).unwrap(), AdvisoryMessage::GoodChance);
        assert_eq!(advise(2.99, 10.0).unwrap(), AdvisoryMessage::LowActivity);
    }

    #[test]
    fn test_cloud_cover_is_clamped_not_rejected() {
        assert_eq!(advise(6.0, 250.0).unwrap(), AdvisoryMessage::TooCloudy);
        assert_eq!(advise(6.0, -40.0).unwrap(), AdvisoryMessage::GreatChance);
    }

    #[test]
    fn test_nan_inputs_are_rejected() {
        assert!(advise(f64::NAN, 10.0).is_err(), "NaN kp must not be coerced");
        assert!(advise(4.0, f64::NAN).is_err(), "NaN clouds must not be coerced");
    }

    #[test]
    fn test_display_includes_icon_and_text() {
        let shown = AdvisoryMessage::TooCloudy.to_string();
        assert!(shown.starts_with("☁️"));
        assert!(shown.contains("Too cloudy"));
    }
}
