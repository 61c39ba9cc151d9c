//! Aurora service CLI.
//!
//! Shows current geomagnetic conditions, aurora viewing advice, the Kp storm
//! outlook and the moon phase, once or on a refresh loop.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use aurora_service::config::{load_config, Config, DEFAULT_CONFIG_PATH};
use aurora_service::dashboard::fetch_snapshot;
use aurora_service::logging::{self, DataSource};
use aurora_service::moon::moon_phase;
use aurora_service::scheduler::RecurringTask;
use aurora_service::verify::{print_report, run_full_verification};

/// Space-weather and aurora visibility monitor.
#[derive(Parser)]
#[command(name = "aurora_service")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all feeds once and print the dashboard.
    Now {
        /// Print the snapshot as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Refresh conditions and moon phase on their configured intervals.
    Watch,
    /// Print the moon phase for an instant (default: now).
    Moon {
        /// RFC 3339 instant, e.g. 2024-04-08T18:21:00Z.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Check that every configured feed responds and parses.
    Verify {
        #[arg(long)]
        json: bool,
    },
}

fn http_client(config: &Config) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.refresh.http_timeout_secs))
        .user_agent(concat!("aurora_service/", env!("CARGO_PKG_VERSION")))
        .build()
}

fn run_watch(config: Config) -> Result<(), Box<dyn Error>> {
    let client = http_client(&config)?;
    let current_interval = Duration::from_secs(config.refresh.current_interval_secs);
    let moon_interval = Duration::from_secs(config.refresh.moon_interval_secs);

    logging::info(
        DataSource::System,
        None,
        &format!(
            "Watching {} (conditions every {}s, moon every {}s)",
            config.location.name,
            current_interval.as_secs(),
            moon_interval.as_secs()
        ),
    );

    let current_config = config.clone();
    let _current = RecurringTask::spawn("current-conditions", current_interval, move || {
        let snapshot = fetch_snapshot(&client, &current_config, Utc::now());
        println!("\n{}", snapshot);
    })?;

    let _moon = RecurringTask::spawn("moon-phase", moon_interval, || {
        println!("\n{}", moon_phase(Utc::now()));
    })?;

    // Tasks run until the process is interrupted.
    loop {
        std::thread::park();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    match cli.command {
        Commands::Now { json } => {
            let client = http_client(&config)?;
            let snapshot = fetch_snapshot(&client, &config, Utc::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", snapshot);
            }
        }
        Commands::Watch => run_watch(config)?,
        Commands::Moon { at } => {
            println!("{}", moon_phase(at.unwrap_or_else(Utc::now)));
        }
        Commands::Verify { json } => {
            let report = run_full_verification(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            if report.summary.working == 0 {
                return Err("no feeds are working".into());
            }
        }
    }

    Ok(())
}
