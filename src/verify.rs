//! Data Feed Verification Module
//!
//! Checks each configured feed against the live endpoint to see whether it
//! responds and parses. Run before pointing the service at a new endpoint
//! or after SWPC announces a product format change.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;

use crate::config::Config;
use crate::ingest::{open_meteo, swpc};
use crate::model::SpaceWeatherError;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<FeedVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedVerification {
    pub name: String,
    pub url: String,
    pub status: VerificationStatus,
    pub api_responsive: bool,
    pub sample_rows: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    /// Endpoint answered but the body did not parse into usable rows.
    PartialSuccess,
    Failed,
}

/// The feeds the service depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Plasma,
    Mag,
    Kp,
    KpForecast,
    Weather,
}

impl Feed {
    pub const ALL: [Feed; 5] = [Feed::Plasma, Feed::Mag, Feed::Kp, Feed::KpForecast, Feed::Weather];

    pub fn name(&self) -> &'static str {
        match self {
            Feed::Plasma => swpc::FEED_PLASMA,
            Feed::Mag => swpc::FEED_MAG,
            Feed::Kp => swpc::FEED_KP,
            Feed::KpForecast => swpc::FEED_KP_FORECAST,
            Feed::Weather => open_meteo::FEED_WEATHER,
        }
    }

    pub fn url(&self, config: &Config) -> String {
        match self {
            Feed::Plasma => config.feeds.plasma_url.clone(),
            Feed::Mag => config.feeds.mag_url.clone(),
            Feed::Kp => config.feeds.kp_url.clone(),
            Feed::KpForecast => config.feeds.kp_forecast_url.clone(),
            Feed::Weather => {
                open_meteo::build_forecast_url(&config.feeds.weather_base_url, &config.location)
            }
        }
    }

    /// Parses a body the way the service would, returning the number of
    /// usable rows.
    pub fn check_body(&self, body: &str) -> Result<usize, SpaceWeatherError> {
        match self {
            Feed::Plasma => swpc::parse_plasma(body).map(|_| count_rows(body, self.name())),
            Feed::Mag => swpc::parse_mag(body).map(|_| count_rows(body, self.name())),
            Feed::Kp => swpc::parse_current_kp(body).map(|_| count_rows(body, self.name())),
            Feed::KpForecast => swpc::parse_kp_forecast(body).map(|series| series.len()),
            Feed::Weather => open_meteo::parse_forecast(body).map(|_| 1),
        }
    }
}

/// Data rows in a feed body; a header row is not counted.
fn count_rows(body: &str, feed: &str) -> usize {
    swpc::Table::parse(body, feed)
        .map(|table| table.rows.len())
        .unwrap_or(0)
}

// ============================================================================
// Feed Verification
// ============================================================================

pub fn verify_feed(
    client: &reqwest::blocking::Client,
    feed: Feed,
    config: &Config,
) -> FeedVerification {
    let url = feed.url(config);
    let mut result = FeedVerification {
        name: feed.name().to_string(),
        url: url.clone(),
        status: VerificationStatus::Failed,
        api_responsive: false,
        sample_rows: 0,
        error_message: None,
    };

    match swpc::fetch_body(client, &url) {
        Ok(body) => {
            result.api_responsive = true;
            apply_body_check(&mut result, feed, &body);
        }
        Err(e) => {
            result.error_message = Some(format!("API request failed: {}", e));
        }
    }

    result
}

fn apply_body_check(result: &mut FeedVerification, feed: Feed, body: &str) {
    match feed.check_body(body) {
        Ok(rows) => {
            result.sample_rows = rows;
            result.status = VerificationStatus::Success;
        }
        Err(e) => {
            result.status = VerificationStatus::PartialSuccess;
            result.error_message = Some(e.to_string());
        }
    }
}

pub fn summarize(results: &[FeedVerification]) -> VerificationSummary {
    let working = results
        .iter()
        .filter(|r| r.status == VerificationStatus::Success)
        .count();
    VerificationSummary {
        total: results.len(),
        working,
        failed: results.len() - working,
    }
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(config: &Config) -> Result<VerificationReport, Box<dyn Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.refresh.http_timeout_secs))
        .build()?;

    let results: Vec<FeedVerification> = Feed::ALL
        .iter()
        .map(|feed| verify_feed(&client, *feed, config))
        .collect();

    Ok(VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        summary: summarize(&results),
        results,
    })
}

pub fn print_report(report: &VerificationReport) {
    println!("\n🔍 Feed verification ({})", report.timestamp);
    println!("═══════════════════════════════════════════════════════════");
    for r in &report.results {
        let mark = match r.status {
            VerificationStatus::Success => "✓",
            VerificationStatus::PartialSuccess => "⚠",
            VerificationStatus::Failed => "✗",
        };
        println!("{} {:<20} {} rows", mark, r.name, r.sample_rows);
        if let Some(err) = &r.error_message {
            println!("    {}", err);
        }
    }
    println!("═══════════════════════════════════════════════════════════");
    println!(
        "Summary: {}/{} working, {} failed\n",
        report.summary.working, report.summary.total, report.summary.failed
    );
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(feed: Feed) -> FeedVerification {
        FeedVerification {
            name: feed.name().to_string(),
            url: String::new(),
            status: VerificationStatus::Failed,
            api_responsive: true,
            sample_rows: 0,
            error_message: None,
        }
    }

    #[test]
    fn test_parsable_body_is_success() {
        let mut result = blank(Feed::Mag);
        let body = r#"[["time_tag","bx_gsm","by_gsm","bz_gsm"],["2024-05-10 18:00:00.000","1","2","-3"]]"#;
        apply_body_check(&mut result, Feed::Mag, body);
        assert_eq!(result.status, VerificationStatus::Success);
        assert_eq!(result.sample_rows, 1, "header row is not a data row");
    }

    #[test]
    fn test_object_feed_counts_every_entry() {
        let mut result = blank(Feed::Kp);
        let body = r#"[{"time_tag":"2024-05-10T17:58:00","kp_index":7},
                       {"time_tag":"2024-05-10T17:59:00","kp_index":8}]"#;
        apply_body_check(&mut result, Feed::Kp, body);
        assert_eq!(result.status, VerificationStatus::Success);
        assert_eq!(result.sample_rows, 2);
    }

    #[test]
    fn test_unparsable_body_is_partial_success() {
        let mut result = blank(Feed::KpForecast);
        apply_body_check(&mut result, Feed::KpForecast, "[]");
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert!(result.error_message.is_some());
    }

    #[test]
    fn test_summary_counts() {
        let mut ok = blank(Feed::Plasma);
        ok.status = VerificationStatus::Success;
        let summary = summarize(&[ok, blank(Feed::Weather)]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.working, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_weather_url_is_built_from_location() {
        let config = Config::default();
        assert!(Feed::Weather.url(&config).contains("latitude=69.65"));
        assert_eq!(Feed::Plasma.url(&config), config.feeds.plasma_url);
    }
}
