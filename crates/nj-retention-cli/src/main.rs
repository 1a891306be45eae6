//! `nj-expiry` — inspect temporary-chat expiration instants.
//!
//! ```text
//! nj-expiry midnight [--now RFC3339] [--timezone NAME]
//! nj-expiry expires-at [--now RFC3339] [--settings PATH]
//! nj-expiry offset --date YYYY-MM-DD [--timezone NAME]
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr (`RUST_LOG`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use nj_retention::{
    describe_next_local_midnight, format_utc_offset, load_settings, load_settings_from_path,
    parse_timezone, retention_hours, settings::settings_path, utc_offset_at_local_midnight, Clock,
    FixedClock, SystemClock, NEW_JERSEY_TIMEZONE,
};

#[derive(Parser)]
#[command(name = "nj-expiry", version, about = "Temporary-chat expiration instants")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Next local midnight in a timezone
    Midnight {
        /// Anchor instant (RFC 3339). Defaults to the system clock.
        #[arg(long)]
        now: Option<String>,
        /// IANA timezone name
        #[arg(long, default_value = NEW_JERSEY_TIMEZONE)]
        timezone: String,
    },
    /// Expiration a temporary chat created now would get
    ExpiresAt {
        /// Anchor instant (RFC 3339). Defaults to the system clock.
        #[arg(long)]
        now: Option<String>,
        /// Settings file. Defaults to $NJ_RETENTION_SETTINGS or ./nj-retention.json
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// UTC offset in force at local midnight of a date
    Offset {
        /// Civil date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// IANA timezone name
        #[arg(long, default_value = NEW_JERSEY_TIMEZONE)]
        timezone: String,
    },
}

#[derive(Serialize)]
struct ExpiresAtReport {
    now: String,
    expires_at: String,
    mode: &'static str,
    retention_hours: i64,
}

#[derive(Serialize)]
struct OffsetReport {
    date: String,
    timezone: String,
    utc_offset: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Command::Midnight { now, timezone } => {
            let now = clock_for(now.as_deref())?.now();
            let report = describe_next_local_midnight(now, &timezone)
                .with_context(|| format!("cannot compute next midnight in {timezone}"))?;
            serde_json::to_string_pretty(&report)?
        }
        Command::ExpiresAt { now, settings } => {
            let now = clock_for(now.as_deref())?.now();
            let settings = match &settings {
                Some(path) => load_settings_from_path(path)
                    .with_context(|| format!("failed to load settings from {}", path.display()))?,
                None => {
                    debug!(path = ?settings_path(), "using default settings location");
                    load_settings().context("failed to load settings")?
                }
            };
            let hours = retention_hours(Some(&settings.interface));
            debug!(mode = settings.expiration.mode(), hours, "resolved retention settings");
            let expires = settings.expiration.expiration_for(now, hours)?;
            let report = ExpiresAtReport {
                now: now.to_rfc3339(),
                expires_at: expires.to_rfc3339(),
                mode: settings.expiration.mode(),
                retention_hours: hours,
            };
            serde_json::to_string_pretty(&report)?
        }
        Command::Offset { date, timezone } => {
            let parsed = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid date '{date}', expected YYYY-MM-DD"))?;
            let tz = parse_timezone(&timezone)?;
            let offset = utc_offset_at_local_midnight(parsed, tz)?;
            let report = OffsetReport {
                date,
                timezone,
                utc_offset: format_utc_offset(offset),
            };
            serde_json::to_string_pretty(&report)?
        }
    };

    println!("{output}");
    Ok(())
}

fn clock_for(now: Option<&str>) -> Result<Box<dyn Clock>> {
    match now {
        Some(s) => {
            let instant = DateTime::parse_from_rfc3339(s)
                .with_context(|| format!("invalid --now '{s}', expected RFC 3339"))?;
            Ok(Box::new(FixedClock(instant.with_timezone(&Utc))))
        }
        None => Ok(Box::new(SystemClock)),
    }
}
