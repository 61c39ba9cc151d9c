//! Storm look-ahead over the 3-hour K-index forecast series.
//!
//! The series is expected in chronological order, as SWPC publishes it.
//! Nothing here sorts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::KpSample;

/// Kp at or above which a forecast slot counts as a storm (NOAA G1).
pub const STORM_THRESHOLD_KP: f64 = 5.0;

/// Kp at or above which tonight's storm chance is "very high".
pub const VERY_HIGH_CHANCE_KP: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StormChance {
    VeryHigh,
    High,
    Low,
}

impl std::fmt::Display for StormChance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StormChance::VeryHigh => write!(f, "Very High"),
            StormChance::High => write!(f, "High"),
            StormChance::Low => write!(f, "Low"),
        }
    }
}

/// Returns the first entry with Kp >= 5, scanning in the given order.
///
/// NaN entries never compare as storms and are skipped.
pub fn find_next_storm(series: &[KpSample]) -> Option<&KpSample> {
    series.iter().find(|sample| sample.k_index >= STORM_THRESHOLD_KP)
}

/// Summarises a `find_next_storm` result as tonight's chance.
pub fn chance_tonight(next_storm: Option<&KpSample>) -> StormChance {
    match next_storm {
        Some(sample) if sample.k_index >= VERY_HIGH_CHANCE_KP => StormChance::VeryHigh,
        Some(_) => StormChance::High,
        None => StormChance::Low,
    }
}

/// Drops the leading entries that ended before `now`.
///
/// A 3-hour slot whose start is before `now` but whose end is not is kept,
/// since it is the slot currently in progress.
pub fn upcoming(series: &[KpSample], now: DateTime<Utc>) -> &[KpSample] {
    let slot = chrono::Duration::hours(3);
    let start = series
        .iter()
        .position(|sample| sample.timestamp + slot > now)
        .unwrap_or(series.len());
    &series[start..]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(hour: u32, k_index: f64) -> KpSample {
        KpSample {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 10, hour, 0, 0).unwrap(),
            k_index,
            observed: false,
        }
    }

    #[test]
    fn test_first_storm_entry_is_returned() {
        let series = vec![sample(0, 2.0), sample(3, 4.0), sample(6, 5.5), sample(9, 8.0)];
        let found = find_next_storm(&series).expect("5.5 entry should be found");
        assert_eq!(found, &series[2]);
    }

    #[test]
    fn test_no_storm_returns_none() {
        let series = vec![sample(0, 1.0), sample(3, 2.0)];
        assert!(find_next_storm(&series).is_none());
        assert!(find_next_storm(&[]).is_none());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let series = vec![sample(0, 4.99), sample(3, 5.0)];
        assert_eq!(find_next_storm(&series).map(|s| s.k_index), Some(5.0));
    }

    #[test]
    fn test_caller_order_is_respected() {
        // Out of chronological order on purpose: the scan does not sort.
        let series = vec![sample(9, 7.0), sample(3, 5.0)];
        assert_eq!(find_next_storm(&series).map(|s| s.k_index), Some(7.0));
    }

    #[test]
    fn test_chance_tonight() {
        let strong = sample(0, 6.0);
        let minor = sample(0, 5.67);
        assert_eq!(chance_tonight(Some(&strong)), StormChance::VeryHigh);
        assert_eq!(chance_tonight(Some(&minor)), StormChance::High);
        assert_eq!(chance_tonight(None), StormChance::Low);
    }

    #[test]
    fn test_upcoming_keeps_slot_in_progress() {
        let series = vec![sample(0, 6.0), sample(3, 2.0), sample(6, 5.0)];
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 4, 30, 0).unwrap();
        let rest = upcoming(&series, now);
        assert_eq!(rest.len(), 2, "00:00 slot ended at 03:00 and should be dropped");
        assert_eq!(rest[0].timestamp.format("%H").to_string(), "03");
    }

    #[test]
    fn test_upcoming_after_series_end_is_empty() {
        let series = vec![sample(0, 6.0)];
        let now = Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap();
        assert!(upcoming(&series, now).is_empty());
    }
}
