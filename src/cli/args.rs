//! Command-line argument definitions for the fuel price ingester
//!
//! This module defines the CLI interface using the clap derive API.

use crate::{Error, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the fuel price ingester
///
/// Reads daily Tankerkoenig price change logs and writes the price changes of
/// the configured stations to InfluxDB.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fuelprice-ingest",
    version,
    about = "Ingest Tankerkoenig fuel price change logs into InfluxDB",
    long_about = "Reads daily fuel price change logs (one CSV file per day, one row per price \
                  change event) and writes the changed prices of the configured stations to \
                  InfluxDB. Files are processed in the order given."
)]
pub struct Args {
    /// Path to configuration file
    ///
    /// JSON file with the stations to track and the InfluxDB connection. If not
    /// specified, looks for ~/.config/fuelprice-ingest/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Change log files to ingest, in order
    #[arg(value_name = "FILES", required = true, help = "Change log CSV files to ingest")]
    pub files: Vec<PathBuf>,

    /// Skip the first row of every file
    ///
    /// The published daily dumps start with a
    /// `date,station_uuid,diesel,e5,e10,dieselchange,e5change,e10change` header.
    #[arg(long = "has-header", help = "Skip the header row of every file")]
    pub has_header: bool,

    /// Perform a dry run without writing to InfluxDB
    ///
    /// All rows are read and transformed, points are counted but not written.
    #[arg(
        long = "dry-run",
        help = "Transform rows and report counts without writing to InfluxDB"
    )]
    pub dry_run: bool,

    /// Show a progress spinner while reading files
    #[arg(long = "progress", help = "Show a progress spinner per file")]
    pub progress: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the final report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Validate the input files
    ///
    /// The configuration file is checked when it is loaded.
    pub fn validate(&self) -> Result<()> {
        for file in &self.files {
            if !file.is_file() {
                return Err(Error::io(
                    format!("Cannot open change log {}", file.display()),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "not a readable file"),
                ));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbosity and quiet flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Whether to show progress spinners
    pub fn show_progress(&self) -> bool {
        self.progress && !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_and_files() {
        let args = Args::try_parse_from([
            "fuelprice-ingest",
            "-c",
            "config.json",
            "2022-02-04-prices.csv",
            "2022-02-05-prices.csv",
        ])
        .unwrap();

        assert_eq!(args.config_file, Some(PathBuf::from("config.json")));
        assert_eq!(
            args.files,
            vec![
                PathBuf::from("2022-02-04-prices.csv"),
                PathBuf::from("2022-02-05-prices.csv")
            ]
        );
        assert!(!args.has_header);
        assert!(!args.dry_run);
        assert_eq!(args.output_format, OutputFormat::Human);
    }

    #[test]
    fn test_files_are_required() {
        assert!(Args::try_parse_from(["fuelprice-ingest", "-c", "config.json"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let args = Args::try_parse_from(["fuelprice-ingest", "a.csv"]).unwrap();
        assert_eq!(args.get_log_level(), "warn");

        let args = Args::try_parse_from(["fuelprice-ingest", "-vv", "a.csv"]).unwrap();
        assert_eq!(args.get_log_level(), "debug");

        let args = Args::try_parse_from(["fuelprice-ingest", "-q", "a.csv"]).unwrap();
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["fuelprice-ingest", "-q", "-v", "a.csv"]).is_err());
    }

    #[test]
    fn test_validate_missing_file() {
        let args = Args::try_parse_from(["fuelprice-ingest", "/nonexistent/prices.csv"]).unwrap();
        assert!(matches!(args.validate(), Err(Error::Io { .. })));
    }

    #[test]
    fn test_validate_leaves_config_file_to_loader() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let input = file.path().to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "fuelprice-ingest",
            "-c",
            "/nonexistent/config.json",
            input.as_str(),
        ])
        .unwrap();

        assert!(args.validate().is_ok());
        let err = crate::Config::load(args.config_file.as_deref()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
