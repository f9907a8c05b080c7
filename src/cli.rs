//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// JobScope - occupation automation-risk dashboard service
///
/// Serves aggregate and per-job views over a dataset of occupations
/// tagged with a four-level taxonomy and task-level automation analysis.
///
/// Examples:
///   jobscope --data job_data.json
///   jobscope --data job_data.json --bind 0.0.0.0:8080 --lazy
///   jobscope --data job_data.json --report summary.md
///   jobscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the JSON job data file
    ///
    /// Overrides the `[data] path` setting of the config file.
    #[arg(short, long, value_name = "FILE", env = "JOBSCOPE_DATA")]
    pub data: Option<PathBuf>,

    /// Address the HTTP server listens on
    #[arg(short, long, value_name = "ADDR", env = "JOBSCOPE_BIND")]
    pub bind: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .jobscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Load the dataset on first request instead of at startup
    #[arg(long)]
    pub lazy: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Write a dataset summary report to FILE and exit instead of serving
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Output format of the summary report (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Generate a default .jobscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref bind) = self.bind {
            if bind.parse::<SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {}", bind));
            }
        }

        if let Some(ref data) = self.data {
            if data.is_dir() {
                return Err(format!("Data path is a directory: {}", data.display()));
            }
        }

        if self.report.is_some() && self.lazy {
            return Err("--lazy has no effect with --report".to_string());
        }

        Ok(())
    }

    /// Returns the log level; `config_verbose` is the config file's
    /// `[general] verbose` setting.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: Some(PathBuf::from("job_data.json")),
            bind: None,
            config: None,
            lazy: false,
            verbose: false,
            quiet: false,
            report: None,
            format: OutputFormat::Markdown,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.bind = Some("0.0.0.0:8080".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_bind() {
        let mut args = make_args();
        args.bind = Some("localhost".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.report = Some(PathBuf::from("summary.md"));
        args.lazy = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_data_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = make_args();
        args.data = Some(dir.path().to_path_buf());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        // The config file can turn on verbose output, but --quiet wins.
        args.verbose = false;
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::parse_from(["jobscope", "--data", "jobs.json", "--report", "out.md", "--format", "json"]);
        assert_eq!(args.data, Some(PathBuf::from("jobs.json")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.report, Some(PathBuf::from("out.md")));
    }
}
