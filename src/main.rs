//! # apptime CLI Entry Point
//!
//! Command-line front end for the focus-time tracker.
//!
//! ## Usage
//!
//! ```bash
//! # Track until Ctrl-C, printing a live summary every minute
//! apptime track
//!
//! # Today's ranked usage, or another day's
//! apptime summary
//! apptime summary --date 2024-05-01
//!
//! # Days with recorded usage, and deleting one
//! apptime dates
//! apptime delete 2024-05-01
//!
//! # Show or change front-end preferences
//! apptime settings --auto-refresh false
//! ```
//!
//! ## Files
//!
//! Usage data and settings live in the platform data/config directories
//! unless overridden with `--data-file` / `--settings-file`.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. Set `RUST_LOG` to override
//! the filter, or pass `--verbose` for debug output from apptime itself.

use apptime::config::{self, Settings, TrackerConfig};
use apptime::probe;
use apptime::usage::{format_duration, format_percentage, Summary, DATE_FORMAT};
use apptime::Tracker;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// apptime - see where your screen time goes
#[derive(Parser, Debug)]
#[command(name = "apptime")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track time spent per focused application", long_about = None)]
struct Args {
    /// Usage data file (defaults to the platform data directory)
    #[arg(long, value_name = "FILE", global = true)]
    data_file: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    settings_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track the focused application until interrupted
    Track {
        /// Seconds between samples
        #[arg(long, value_name = "SECS", default_value_t = 1,
              value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Seconds between live summaries (when auto refresh is enabled)
        #[arg(long, value_name = "SECS", default_value_t = 60,
              value_parser = clap::value_parser!(u64).range(1..))]
        report: u64,

        /// Track even if xdotool is missing (everything is credited to "Unknown")
        #[arg(long)]
        allow_missing_probe: bool,
    },

    /// Show ranked usage for a day
    Summary {
        /// Day to summarize (YYYY-MM-DD), defaults to today
        #[arg(long, value_name = "DATE", value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// List days with recorded usage, newest first
    Dates,

    /// Delete all usage recorded on a day
    Delete {
        /// Day to delete (YYYY-MM-DD)
        #[arg(value_name = "DATE", value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Show or change persisted settings
    Settings {
        /// Refresh the live summary while tracking
        #[arg(long, value_name = "BOOL")]
        auto_refresh: Option<bool>,

        /// Prefer a dark colour scheme
        #[arg(long, value_name = "BOOL")]
        dark_mode: Option<bool>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run_application(args).await
}

fn init_tracing(verbose: bool) {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "apptime=debug".to_string()
        } else {
            "apptime=info".to_string()
        }
    });
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_application(args: Args) -> Result<()> {
    let data_file = match args.data_file {
        Some(path) => path,
        None => config::default_data_file()?,
    };
    let settings_file = match args.settings_file {
        Some(path) => path,
        None => config::default_settings_file()?,
    };

    match args.command {
        Command::Track {
            interval,
            report,
            allow_missing_probe,
        } => {
            let mut tracker_config = TrackerConfig::new(data_file);
            tracker_config.tick_interval = Duration::from_secs(interval);
            let settings = Settings::load_or_default(&settings_file);
            run_track(
                &tracker_config,
                settings,
                Duration::from_secs(report),
                allow_missing_probe,
            )
            .await
        }
        Command::Summary { date } => {
            let tracker = Tracker::with_system_probe(&TrackerConfig::new(data_file));
            print!("{}", render_summary(&tracker.get_summary(date)));
            Ok(())
        }
        Command::Dates => {
            let tracker = Tracker::with_system_probe(&TrackerConfig::new(data_file));
            print!("{}", render_dates(&tracker.list_dates()));
            Ok(())
        }
        Command::Delete { date } => {
            let tracker = Tracker::with_system_probe(&TrackerConfig::new(data_file));
            if tracker.delete_date(date) {
                println!("Deleted usage for {date}");
            } else {
                println!("No usage recorded for {date}");
            }
            Ok(())
        }
        Command::Settings {
            auto_refresh,
            dark_mode,
        } => {
            let mut settings = Settings::load_or_default(&settings_file);
            if auto_refresh.is_some() || dark_mode.is_some() {
                if let Some(value) = auto_refresh {
                    settings.auto_refresh = value;
                }
                if let Some(value) = dark_mode {
                    settings.dark_mode = value;
                }
                settings.save_to(&settings_file)?;
            }
            println!("auto_refresh = {}", settings.auto_refresh);
            println!("dark_mode = {}", settings.dark_mode);
            Ok(())
        }
    }
}

async fn run_track(
    tracker_config: &TrackerConfig,
    settings: Settings,
    report_every: Duration,
    allow_missing_probe: bool,
) -> Result<()> {
    if !probe::xdotool_available() {
        if !allow_missing_probe {
            eprintln!("Error: xdotool is not installed. Please install it with:");
            eprintln!("  sudo apt install xdotool");
            eprintln!("\nOr pass --allow-missing-probe to record everything as \"Unknown\".");
            anyhow::bail!("xdotool is required for focus tracking");
        }
        tracing::warn!("xdotool not found; all time will be credited to Unknown");
    }

    let tracker = Arc::new(Tracker::with_system_probe(tracker_config));
    tracker
        .start()
        .context("Failed to start the sampling thread")?;
    eprintln!(
        "Tracking focus, saving to {} (Ctrl-C to stop)",
        tracker.data_file().display()
    );

    let mut report = tokio::time::interval(report_every);
    // The first tick completes immediately; skip it so the first report
    // covers a full period.
    report.tick().await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            _ = report.tick(), if settings.auto_refresh => {
                print!("{}", render_summary(&tracker.get_summary(None)));
            }
        }
    }

    let stopping = Arc::clone(&tracker);
    let saved = tokio::task::spawn_blocking(move || stopping.stop())
        .await
        .context("Failed to join the sampling thread")?;

    print!("{}", render_summary(&tracker.get_summary(None)));

    if !saved {
        anyhow::bail!(
            "Failed to save usage data to {}; this session's data was not persisted",
            tracker.data_file().display()
        );
    }
    Ok(())
}

/// Render a summary as a plain-text table
fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Date: {}, Day: {}",
        summary.date.format(DATE_FORMAT),
        summary.date.format("%A")
    );

    if summary.is_empty() {
        let _ = writeln!(out, "No usage recorded.");
    } else {
        let _ = writeln!(out, "{:<50} {:>12} {:>8}", "Application", "Time Spent", "Share");
        for entry in &summary.entries {
            let _ = writeln!(
                out,
                "{:<50} {:>12} {:>8}",
                entry.app_id,
                format_duration(entry.seconds),
                format_percentage(entry.percentage)
            );
        }
    }

    let _ = writeln!(
        out,
        "Total tracked time: {:.2} hours",
        summary.total_hours()
    );
    out
}

/// Render dates newest first, one per line
fn render_dates(dates: &[NaiveDate]) -> String {
    if dates.is_empty() {
        return "No usage recorded yet.\n".to_string();
    }
    let mut out = String::new();
    for date in dates.iter().rev() {
        let _ = writeln!(out, "{}", date.format(DATE_FORMAT));
    }
    out
}
