//! Command-line flags via `clap`.
//!
//! Required flags are declared optional here so that [`Config::validate`] can report
//! every missing one in a single message.

use crate::config::{Config, SeveritySource};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "gh-codeql-report",
    version,
    about = "Generate a CodeQL report from GitHub alerts",
    long_about = "Generate a comprehensive CodeQL report from GitHub alerts.\n\nReads a CSV file with repository and alert number columns, queries the GitHub\ncode scanning API for each alert, and writes a CSV report with severity,\ndescriptions and the location of the most recent instance.\n\nConfiguration precedence: flags > --config file > defaults.",
    after_help = "Examples:\n  gh-codeql-report --token $GITHUB_TOKEN --input alerts.csv\n  gh-codeql-report --token $GITHUB_TOKEN --input alerts.csv --output report.csv --log logs/run.log --verbose"
)]
/// Top-level command-line options.
#[allow(missing_docs)]
pub struct Cli {
    #[arg(long, help = "GitHub access token (required)")]
    pub token: Option<String>,

    #[arg(long, help = "Path to the input CSV file (required)")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Path to the output CSV file [default: codeql-report.csv]")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Path to the log file (default: stderr)")]
    pub log: Option<PathBuf>,

    #[arg(long, action = clap::ArgAction::SetTrue, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_name = "FILE", help = "JSON settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "URL", help = "GitHub REST API root (GitHub Enterprise: https://HOST/api/v3)")]
    pub api_url: Option<String>,

    #[arg(long, value_name = "NAME", help = "Input column holding owner/name [default: Repository]")]
    pub repo_column: Option<String>,

    #[arg(long, value_name = "NAME", help = "Input column holding the alert number [default: Alert Number]")]
    pub alert_column: Option<String>,

    #[arg(long, value_enum, help = "Alert field used for the Severity column")]
    pub severity_source: Option<SeveritySource>,

    #[arg(long, value_name = "N", help = "Rate limit retries per alert before giving up [default: 5]")]
    pub max_retries: Option<u32>,

    #[arg(long, value_name = "SECS", help = "Overall time budget for the run in seconds [default: 1800]")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Resolve flags into a run configuration
    ///
    /// Starts from the `--config` file when given (or defaults), then applies every
    /// flag that was set. Does not validate; see [`Config::validate`].
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(token) = self.token {
            config.token = token;
        }
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(log) = self.log {
            config.log.file = Some(log);
        }
        config.log.verbose |= self.verbose;
        if let Some(url) = self.api_url {
            config.api.url = url;
        }
        if let Some(column) = self.repo_column {
            config.columns.repository = column;
        }
        if let Some(column) = self.alert_column {
            config.columns.alert_number = column;
        }
        if let Some(source) = self.severity_source {
            config.severity_source = source;
        }
        if let Some(retries) = self.max_retries {
            config.rate_limit.max_retries = retries;
        }
        if let Some(secs) = self.timeout {
            config.run_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
