/// Measurement staleness detection.
///
/// The SWPC real-time solar wind feeds update every minute. When the
/// spacecraft link drops, the dashboard keeps showing the last row with no
/// visible hint that it is old. This module lets the service flag that.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally, so staleness is deterministic in tests.

use chrono::{DateTime, Utc};

use crate::model::{Measurement, SpaceWeatherError};

/// Age of the measurement in whole minutes relative to `now`.
/// Negative if the timestamp lies in the future.
pub fn age_minutes_at(measurement: &Measurement, now: DateTime<Utc>) -> i64 {
    (now - measurement.timestamp).num_minutes()
}

/// Returns `true` if the measurement is older than `max_age_minutes`.
///
/// Staleness is strictly greater than the threshold:
///   age > max_age_minutes  →  stale
///   age == max_age_minutes →  not stale
pub fn is_stale_at(measurement: &Measurement, max_age_minutes: i64, now: DateTime<Utc>) -> bool {
    age_minutes_at(measurement, now) > max_age_minutes
}

/// Convenience wrapper that uses the real current time.
pub fn is_stale(measurement: &Measurement, max_age_minutes: i64) -> bool {
    is_stale_at(measurement, max_age_minutes, Utc::now())
}

/// Turns a stale measurement into `StaleData` for the given feed name.
pub fn ensure_fresh(
    measurement: &Measurement,
    feed: &str,
    max_age_minutes: i64,
    now: DateTime<Utc>,
) -> Result<(), SpaceWeatherError> {
    ensure_row_fresh(measurement.timestamp, feed, max_age_minutes, now)
}

/// Same rule as `ensure_fresh`, for a single feed row's time tag.
pub fn ensure_row_fresh(
    timestamp: DateTime<Utc>,
    feed: &str,
    max_age_minutes: i64,
    now: DateTime<Utc>,
) -> Result<(), SpaceWeatherError> {
    let age_minutes = (now - timestamp).num_minutes();
    if age_minutes > max_age_minutes {
        return Err(SpaceWeatherError::StaleData {
            feed: feed.to_string(),
            age_minutes,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
