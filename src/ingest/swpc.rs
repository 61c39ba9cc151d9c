/// NOAA SWPC (Space Weather Prediction Center) feed client
///
/// Retrieves real-time solar wind plasma and magnetometer data and the
/// planetary K-index from the public SWPC JSON products.
///
/// Products used:
///   - plasma-1-day.json    `[["time_tag","density","speed","temperature"], [...], ...]`
///   - mag-1-day.json       `[["time_tag","bx_gsm","by_gsm","bz_gsm",...], [...], ...]`
///   - planetary_k_index_1m.json  `[{"time_tag": ..., "kp_index": 2, ...}, ...]`
///   - noaa-planetary-k-index-forecast.json  `[["time_tag","kp","observed",...], ...]`
///
/// Both shapes (header row + value rows, or array of objects) are read into
/// the same `Table` so that columns are always located by name.
///
/// API Documentation: https://services.swpc.noaa.gov/

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::config::FeedConfig;
use crate::model::{KpSample, Measurement, SpaceWeatherError};

pub const FEED_PLASMA: &str = "plasma-1-day";
pub const FEED_MAG: &str = "mag-1-day";
pub const FEED_KP: &str = "planetary-k-index";
pub const FEED_KP_FORECAST: &str = "kp-forecast";

// Positional fallbacks for tables whose header lacks the expected name.
const DENSITY_COLUMN: usize = 1;
const SPEED_COLUMN: usize = 2;
const BZ_COLUMN: usize = 4;

// ============================================================================
// Table representation
// ============================================================================

/// A feed body normalised to a header plus rows of JSON values.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Reads either an array-of-arrays with a header row, or an array of
    /// objects.
    pub fn parse(body: &str, feed: &str) -> Result<Table, SpaceWeatherError> {
        let json: Value = serde_json::from_str(body)?;
        let items = json
            .as_array()
            .ok_or_else(|| SpaceWeatherError::ParseError(format!("{}: expected a JSON array", feed)))?;

        match items.first() {
            None => Err(SpaceWeatherError::NoDataAvailable(feed.to_string())),
            Some(Value::Array(header)) => {
                let header = header
                    .iter()
                    .map(|h| h.as_str().unwrap_or_default().to_string())
                    .collect();
                let rows = items[1..]
                    .iter()
                    .filter_map(|row| row.as_array().cloned())
                    .collect();
                Ok(Table { header, rows })
            }
            Some(Value::Object(first)) => {
                let header: Vec<String> = first.keys().cloned().collect();
                let rows = items
                    .iter()
                    .filter_map(|item| item.as_object())
                    .map(|obj| {
                        header
                            .iter()
                            .map(|key| obj.get(key).cloned().unwrap_or(Value::Null))
                            .collect::<Vec<Value>>()
                    })
                    .collect();
                Ok(Table { header, rows })
            }
            Some(_) => Err(SpaceWeatherError::ParseError(format!(
                "{}: rows must be arrays or objects",
                feed
            ))),
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Column index by name, or `fallback` if the header doesn't name it.
    pub fn column_or(&self, name: &str, fallback: usize) -> usize {
        self.column(name).unwrap_or(fallback)
    }
}

/// Reads a numeric cell. SWPC ships numbers as strings in the table
/// products and as JSON numbers in the object products.
pub fn cell_f64(row: &[Value], index: usize) -> Option<f64> {
    let value = match row.get(index)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

pub fn cell_str(row: &[Value], index: usize) -> Option<&str> {
    row.get(index)?.as_str()
}

/// Parses SWPC time tags, which are UTC without an offset:
/// `2024-05-10 18:00:00.000`, `2024-05-10 18:00:00`, `2024-05-10T18:00:00`.
/// RFC 3339 with an explicit offset is also accepted.
pub fn parse_time_tag(tag: &str) -> Result<DateTime<Utc>, SpaceWeatherError> {
    let tag = tag.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(tag) {
        return Ok(dt.with_timezone(&Utc));
    }
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(tag, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SpaceWeatherError::ParseError(format!("unrecognised time tag '{}'", tag)))
}

fn row_time(row: &[Value], time_col: usize) -> Option<DateTime<Utc>> {
    cell_str(row, time_col).and_then(|tag| parse_time_tag(tag).ok())
}

// ============================================================================
// Feed parsers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PlasmaSample {
    pub timestamp: DateTime<Utc>,
    pub density_cm3: f64,
    pub speed_km_s: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MagSample {
    pub timestamp: DateTime<Utc>,
    pub bz_gsm_nt: f64,
}

/// Latest plasma row with both density and speed present.
pub fn parse_plasma(body: &str) -> Result<PlasmaSample, SpaceWeatherError> {
    let table = Table::parse(body, FEED_PLASMA)?;
    let time_col = table.column_or("time_tag", 0);
    let density_col = table.column_or("density", DENSITY_COLUMN);
    let speed_col = table.column_or("speed", SPEED_COLUMN);

    table
        .rows
        .iter()
        .rev()
        .find_map(|row| {
            Some(PlasmaSample {
                timestamp: row_time(row, time_col)?,
                density_cm3: cell_f64(row, density_col)?,
                speed_km_s: cell_f64(row, speed_col)?,
            })
        })
        .ok_or_else(|| SpaceWeatherError::NoDataAvailable(FEED_PLASMA.to_string()))
}

/// Latest magnetometer row with a Bz (GSM) value.
pub fn parse_mag(body: &str) -> Result<MagSample, SpaceWeatherError> {
    let table = Table::parse(body, FEED_MAG)?;
    let time_col = table.column_or("time_tag", 0);
    let bz_col = table.column_or("bz_gsm", BZ_COLUMN);

    table
        .rows
        .iter()
        .rev()
        .find_map(|row| {
            Some(MagSample {
                timestamp: row_time(row, time_col)?,
                bz_gsm_nt: cell_f64(row, bz_col)?,
            })
        })
        .ok_or_else(|| SpaceWeatherError::NoDataAvailable(FEED_MAG.to_string()))
}

/// Latest entry carrying a `kp_index`.
pub fn parse_current_kp(body: &str) -> Result<KpSample, SpaceWeatherError> {
    let table = Table::parse(body, FEED_KP)?;
    let kp_col = table
        .column("kp_index")
        .ok_or_else(|| SpaceWeatherError::ParseError(format!("{}: no kp_index field", FEED_KP)))?;
    let time_col = table.column_or("time_tag", 0);

    table
        .rows
        .iter()
        .rev()
        .find_map(|row| {
            Some(KpSample {
                timestamp: row_time(row, time_col)?,
                k_index: cell_f64(row, kp_col)?,
                observed: true,
            })
        })
        .ok_or_else(|| SpaceWeatherError::NoDataAvailable(FEED_KP.to_string()))
}

/// The 3-hour Kp forecast series in feed order. Rows without a Kp value are
/// skipped.
pub fn parse_kp_forecast(body: &str) -> Result<Vec<KpSample>, SpaceWeatherError> {
    let table = Table::parse(body, FEED_KP_FORECAST)?;
    let time_col = table.column_or("time_tag", 0);
    let kp_col = table.column_or("kp", 1);
    let observed_col = table.column("observed");

    let series: Vec<KpSample> = table
        .rows
        .iter()
        .filter_map(|row| {
            Some(KpSample {
                timestamp: row_time(row, time_col)?,
                k_index: cell_f64(row, kp_col)?,
                observed: observed_col
                    .and_then(|col| cell_str(row, col))
                    .map(|s| s == "observed")
                    .unwrap_or(false),
            })
        })
        .collect();

    if series.is_empty() {
        return Err(SpaceWeatherError::NoDataAvailable(FEED_KP_FORECAST.to_string()));
    }
    Ok(series)
}

/// Combines the three current feeds into one validated measurement,
/// stamped with the plasma row's time.
pub fn combine(
    plasma: &PlasmaSample,
    mag: &MagSample,
    kp: &KpSample,
) -> Result<Measurement, SpaceWeatherError> {
    let measurement = Measurement {
        timestamp: plasma.timestamp,
        k_index: kp.k_index,
        solar_wind_speed_km_s: plasma.speed_km_s,
        proton_density_cm3: plasma.density_cm3,
        magnetic_field_z_nt: mag.bz_gsm_nt,
    };
    measurement.validate()?;
    Ok(measurement)
}

// ============================================================================
// API Client Functions
// ============================================================================

/// GETs a feed and returns its body, mapping non-2xx to `HttpError`.
pub fn fetch_body(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<String, SpaceWeatherError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(SpaceWeatherError::HttpError(response.status().as_u16()));
    }

    Ok(response.text()?)
}

pub fn fetch_plasma(
    client: &reqwest::blocking::Client,
    feeds: &FeedConfig,
) -> Result<PlasmaSample, SpaceWeatherError> {
    parse_plasma(&fetch_body(client, &feeds.plasma_url)?)
}

pub fn fetch_mag(
    client: &reqwest::blocking::Client,
    feeds: &FeedConfig,
) -> Result<MagSample, SpaceWeatherError> {
    parse_mag(&fetch_body(client, &feeds.mag_url)?)
}

pub fn fetch_current_kp(
    client: &reqwest::blocking::Client,
    feeds: &FeedConfig,
) -> Result<KpSample, SpaceWeatherError> {
    parse_current_kp(&fetch_body(client, &feeds.kp_url)?)
}

pub fn fetch_kp_forecast(
    client: &reqwest::blocking::Client,
    feeds: &FeedConfig,
) -> Result<Vec<KpSample>, SpaceWeatherError> {
    parse_kp_forecast(&fetch_body(client, &feeds.kp_forecast_url)?)
}

/// Fetches plasma, magnetometer and Kp, and combines them.
pub fn fetch_measurement(
    client: &reqwest::blocking::Client,
    feeds: &FeedConfig,
) -> Result<Measurement, SpaceWeatherError> {
    let plasma = fetch_plasma(client, feeds)?;
    let mag = fetch_mag(client, feeds)?;
    let kp = fetch_current_kp(client, feeds)?;
    combine(&plasma, &mag, &kp)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PLASMA: &str = r#"[
        ["time_tag","density","speed","temperature"],
        ["2024-05-10 17:58:00.000","11.2","702.5","310000"],
        ["2024-05-10 17:59:00.000","12.5","750.1","320000"],
        ["2024-05-10 18:00:00.000",null,null,null]
    ]"#;

    const MAG: &str = r#"[
        ["time_tag","bx_gsm","by_gsm","bz_gsm","lon_gsm","lat_gsm","bt"],
        ["2024-05-10 17:59:00.000","-3.1","9.8","-18.4","107.2","-60.1","21.2"]
    ]"#;

    const KP: &str = r#"[
        {"time_tag":"2024-05-10T17:58:00","kp_index":7,"estimated_kp":7.33,"kp":"7P"},
        {"time_tag":"2024-05-10T17:59:00","kp_index":8,"estimated_kp":8.0,"kp":"8O"},
        {"time_tag":"2024-05-10T18:00:00","kp_index":null,"estimated_kp":null,"kp":null}
    ]"#;

    const FORECAST: &str = r#"[
        ["time_tag","kp","observed","noaa_scale"],
        ["2024-05-10 12:00:00","4.67","observed",null],
        ["2024-05-10 15:00:00","6.33","estimated","G2"],
        ["2024-05-10 18:00:00","8.00","predicted","G4"],
        ["2024-05-10 21:00:00",null,"predicted",null]
    ]"#;

    #[test]
    fn test_plasma_takes_latest_complete_row() {
        let sample = parse_plasma(PLASMA).expect("plasma fixture should parse");
        assert_eq!(sample.density_cm3, 12.5);
        assert_eq!(sample.speed_km_s, 750.1);
        assert_eq!(sample.timestamp, Utc.with_ymd_and_hms(2024, 5, 10, 17, 59, 0).unwrap());
    }

    #[test]
    fn test_plasma_columns_found_by_name_not_position() {
        let reordered = r#"[
            ["time_tag","speed","temperature","density"],
            ["2024-05-10 17:59:00.000","650.0","300000","3.5"]
        ]"#;
        let sample = parse_plasma(reordered).expect("reordered header should parse");
        assert_eq!(sample.speed_km_s, 650.0);
        assert_eq!(sample.density_cm3, 3.5);
    }

    #[test]
    fn test_positional_fallback_when_header_is_unnamed() {
        let unnamed = r#"[
            ["t","a","b","c","d"],
            ["2024-05-10 17:59:00.000","1","2","3","-7.5"]
        ]"#;
        let mag = parse_mag(unnamed).expect("fallback column should be used");
        assert_eq!(mag.bz_gsm_nt, -7.5, "bz falls back to column 4");
    }

    #[test]
    fn test_mag_reads_bz_gsm() {
        assert_eq!(parse_mag(MAG).unwrap().bz_gsm_nt, -18.4);
    }

    #[test]
    fn test_current_kp_skips_trailing_nulls() {
        let kp = parse_current_kp(KP).expect("kp fixture should parse");
        assert_eq!(kp.k_index, 8.0);
    }

    #[test]
    fn test_all_null_rows_is_no_data() {
        let empty = r#"[["time_tag","density","speed"],["2024-05-10 18:00:00.000",null,null]]"#;
        assert_eq!(
            parse_plasma(empty),
            Err(SpaceWeatherError::NoDataAvailable(FEED_PLASMA.to_string()))
        );
        assert!(matches!(parse_plasma("[]"), Err(SpaceWeatherError::NoDataAvailable(_))));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(parse_mag("<html>"), Err(SpaceWeatherError::ParseError(_))));
        assert!(matches!(parse_mag("{\"a\":1}"), Err(SpaceWeatherError::ParseError(_))));
    }

    #[test]
    fn test_forecast_series_keeps_feed_order_and_flags() {
        let series = parse_kp_forecast(FORECAST).expect("forecast fixture should parse");
        assert_eq!(series.len(), 3, "row without kp is skipped");
        assert!(series[0].observed);
        assert!(!series[1].observed);
        assert_eq!(series[2].k_index, 8.0);
        assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_combine_builds_measurement() {
        let m = combine(
            &parse_plasma(PLASMA).unwrap(),
            &parse_mag(MAG).unwrap(),
            &parse_current_kp(KP).unwrap(),
        )
        .expect("valid samples should combine");
        assert_eq!(m.k_index, 8.0);
        assert_eq!(m.solar_wind_speed_km_s, 750.1);
        assert_eq!(m.magnetic_field_z_nt, -18.4);
    }

    #[test]
    fn test_time_tag_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        for tag in [
            "2024-05-10 18:00:00.000",
            "2024-05-10 18:00:00",
            "2024-05-10T18:00:00",
            "2024-05-10T18:00",
            "2024-05-10T20:00:00+02:00",
        ] {
            assert_eq!(parse_time_tag(tag).unwrap(), expected, "tag '{}'", tag);
        }
        assert!(parse_time_tag("yesterday").is_err());
    }
}
