//! Command-line interface for inspecting the reading core.
//!
//! Dates are accepted as `YYYY-MM-DD` or `YYYYMMDD` and default to today's
//! local date.

use crate::calendar::{parse_date_arg, CalendarDate};
use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
    MAX_PREFETCH_DAYS,
};
use crate::errors::CalendarError;
use clap::{Parser, Subcommand};

/// Resolve, cache and prefetch daily readings by calendar date
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, version, long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[arg(long, global = true, default_value = LOG_FORMAT_TEXT, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the content slot of a date
    Slot {
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Resolve the reading for a date and print each update
    Read {
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Fill the cache for a window of dates starting at a date
    Prefetch {
        #[arg(short, long)]
        date: Option<String>,

        /// Number of dates, the start date included (1-31)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PREFETCH_DAYS)))]
        days: Option<u32>,
    },

    /// List the dates of a year that have a reading
    Dates {
        /// Year to map slots onto (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Inspect or maintain the local cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    /// Show entry counts and the cached date range
    Stats,

    /// Drop least recently used entries beyond a limit
    Prune {
        /// Entries to keep (defaults to the configured bound)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Delete entries written by older cache formats
    PurgeLegacy,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <CliArgs as Parser>::parse()
    }
}

/// Parses an optional date argument, falling back to today.
pub fn date_or_today(date: Option<&str>) -> Result<CalendarDate, CalendarError> {
    match date {
        Some(input) => parse_date_arg(input),
        None => Ok(CalendarDate::today()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_with_date() {
        let args = CliArgs::parse_from(["daily-paths", "slot", "--date", "2024-03-01"]);
        assert_eq!(
            args.command,
            Command::Slot {
                date: Some("2024-03-01".to_string())
            }
        );
        assert_eq!(args.log_format, LOG_FORMAT_TEXT);
        assert_eq!(args.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_global_log_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "daily-paths",
            "read",
            "-d",
            "20240301",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.log_format, LOG_FORMAT_JSON);
        assert_eq!(args.log_level, "debug");
        assert_eq!(
            args.command,
            Command::Read {
                date: Some("20240301".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result = CliArgs::try_parse_from(["daily-paths", "--log-format", "xml", "slot"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_prefetch_and_cache_subcommands() {
        let args = CliArgs::parse_from(["daily-paths", "prefetch", "--days", "3"]);
        assert_eq!(
            args.command,
            Command::Prefetch {
                date: None,
                days: Some(3)
            }
        );

        let args = CliArgs::parse_from(["daily-paths", "cache", "prune", "--max", "10"]);
        assert_eq!(
            args.command,
            Command::Cache(CacheCommand::Prune { max: Some(10) })
        );

        let args = CliArgs::parse_from(["daily-paths", "cache", "purge-legacy"]);
        assert_eq!(args.command, Command::Cache(CacheCommand::PurgeLegacy));
    }

    #[test]
    fn test_prefetch_days_bounded_like_config() {
        for days in ["0", "32", "100000"] {
            let result = CliArgs::try_parse_from(["daily-paths", "prefetch", "--days", days]);
            assert!(result.is_err(), "--days {} accepted", days);
        }

        let max = MAX_PREFETCH_DAYS.to_string();
        let args = CliArgs::parse_from(["daily-paths", "prefetch", "--days", max.as_str()]);
        assert_eq!(
            args.command,
            Command::Prefetch {
                date: None,
                days: Some(MAX_PREFETCH_DAYS)
            }
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(CliArgs::try_parse_from(["daily-paths"]).is_err());
    }

    #[test]
    fn test_date_or_today() {
        let parsed = date_or_today(Some("20230115")).unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2023, 1, 15));

        assert!(date_or_today(Some("not-a-date")).is_err());
        assert!(date_or_today(None).is_ok());
    }
}
