/// Data acquisition from public feeds.
///
/// Submodules:
/// - `swpc`        — NOAA SWPC solar wind, magnetometer and Kp products.
/// - `open_meteo`  — local temperature, wind and cloud cover.
///
/// Each module exposes pure `parse_*` functions over response bodies and
/// thin blocking `fetch_*` wrappers around them.

pub mod open_meteo;
pub mod swpc;
