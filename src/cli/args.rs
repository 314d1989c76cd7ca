//! Command-line argument definitions for the EUC ingest tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::ConfigOverrides;
use crate::constants::DEFAULT_DELIMITER;
use crate::{Error, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the EUC participant ingest tool
///
/// Loads a participant export into the dashboard database, replacing its
/// previous contents, and derives the program-wide summary metrics.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "euc-ingest",
    version,
    about = "Load EUC participant exports into the dashboard database",
    long_about = "Parses a delimited participant export, resolves counties and navigators, \
                  loads participant and outcome records, and stores the program summary \
                  metrics. Every run wipes and reloads all dashboard tables."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load a participant export, replacing all dashboard data
    Ingest(IngestArgs),
    /// Show table counts and the stored summary metrics
    Metrics(MetricsArgs),
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Participant export to load
    ///
    /// Falls back to EUC_INPUT_FILE when omitted.
    #[arg(value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Storage connection string
    ///
    /// Overrides DATABASE_URL / EUC_DATABASE_URL. Accepts sqlite://<path>,
    /// sqlite::memory:, :memory: or a plain file path.
    #[arg(long = "database", value_name = "URL", help = "Storage connection string")]
    pub database_url: Option<String>,

    /// Field delimiter of the export
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "CHAR",
        default_value_t = DEFAULT_DELIMITER as char,
        help = "Field delimiter of the export"
    )]
    pub delimiter: char,

    /// Parse, resolve and aggregate against a scratch in-memory store
    ///
    /// The configured database is never opened.
    #[arg(long = "dry-run", help = "Run against a scratch store without touching the database")]
    pub dry_run: bool,

    /// Write the dashboard analytics snapshot as JSON
    #[arg(
        short = 'e',
        long = "export",
        value_name = "PATH",
        help = "Write the dashboard analytics snapshot to PATH"
    )]
    pub export_path: Option<PathBuf>,

    /// Date stamped on the stored metrics (YYYY-MM-DD, defaults to today)
    #[arg(long = "metric-date", value_name = "DATE", value_parser = parse_metric_date)]
    pub metric_date: Option<NaiveDate>,

    /// Disable the row progress bar
    #[arg(long = "no-progress", help = "Disable the progress bar")]
    pub no_progress: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the run report"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the metrics command
#[derive(Debug, Clone, Parser)]
pub struct MetricsArgs {
    /// Storage connection string, overriding DATABASE_URL / EUC_DATABASE_URL
    #[arg(long = "database", value_name = "URL", help = "Storage connection string")]
    pub database_url: Option<String>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the metrics listing"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

fn parse_metric_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        Error::configuration(format!(
            "Invalid metric date '{}' (expected YYYY-MM-DD): {}",
            value, e
        ))
    })
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl IngestArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            level_for(self.verbose)
        }
    }

    /// Progress bars are hidden in quiet mode and for JSON output
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress && self.output_format == OutputFormat::Human
    }

    /// Values that override environment configuration
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_url: self.database_url.clone(),
            input_file: self.input_file.clone(),
            delimiter: Some(self.delimiter),
            dry_run: self.dry_run,
            export_path: self.export_path.clone(),
            metric_date: self.metric_date,
        }
    }
}

impl MetricsArgs {
    pub fn get_log_level(&self) -> &'static str {
        level_for(self.verbose)
    }

    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_url: self.database_url.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingest(argv: &[&str]) -> IngestArgs {
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Some(Commands::Ingest(ingest)) => ingest,
            other => panic!("expected ingest command, got {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand_parses() {
        let args = Args::try_parse_from(["euc-ingest"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_ingest_defaults() {
        let args = ingest(&["euc-ingest", "ingest", "participants.csv"]);

        assert_eq!(args.input_file, Some(PathBuf::from("participants.csv")));
        assert_eq!(args.delimiter, ',');
        assert!(!args.dry_run);
        assert_eq!(args.output_format, OutputFormat::Human);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());
    }

    #[test]
    fn test_ingest_all_flags() {
        let args = ingest(&[
            "euc-ingest",
            "ingest",
            "data.tsv",
            "--database",
            "sqlite://euc.db",
            "--delimiter",
            ";",
            "--dry-run",
            "--export",
            "out/dashboard.json",
            "--metric-date",
            "2024-06-30",
            "--output-format",
            "json",
            "-vv",
        ]);

        assert_eq!(args.database_url.as_deref(), Some("sqlite://euc.db"));
        assert_eq!(args.delimiter, ';');
        assert!(args.dry_run);
        assert_eq!(args.export_path, Some(PathBuf::from("out/dashboard.json")));
        assert_eq!(args.metric_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(args.get_log_level(), "debug");
        assert!(!args.show_progress());

        let overrides = args.config_overrides();
        assert_eq!(overrides.delimiter, Some(';'));
        assert!(overrides.dry_run);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["euc-ingest", "ingest", "a.csv", "-q", "-v"]).is_err());

        let args = ingest(&["euc-ingest", "ingest", "a.csv", "-q"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_bad_metric_date_rejected() {
        assert!(
            Args::try_parse_from(["euc-ingest", "ingest", "a.csv", "--metric-date", "06/30/2024"])
                .is_err()
        );
    }

    #[test]
    fn test_input_file_is_optional() {
        let args = ingest(&["euc-ingest", "ingest"]);
        assert_eq!(args.input_file, None);
    }

    #[test]
    fn test_metrics_command() {
        let args =
            Args::try_parse_from(["euc-ingest", "metrics", "--database", ":memory:"]).unwrap();
        match args.command {
            Some(Commands::Metrics(metrics)) => {
                assert_eq!(
                    metrics.config_overrides().database_url.as_deref(),
                    Some(":memory:")
                );
                assert_eq!(metrics.get_log_level(), "warn");
            }
            other => panic!("expected metrics command, got {other:?}"),
        }
    }
}
