//! Configuration types for codeql-report
//!
//! A [`Config`] is built once at startup (optionally from a JSON settings file, then
//! overlaid by command-line flags) and handed to each component explicitly.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for a report run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// GitHub access token (never read from or written to settings files)
    #[serde(skip)]
    pub token: String,

    /// Input CSV path (required)
    #[serde(default)]
    pub input: PathBuf,

    /// Output CSV path (default: "codeql-report.csv")
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Logging destination and verbosity
    #[serde(default)]
    pub log: LogConfig,

    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Rate limit handling
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Input column names
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Which alert field the report's severity column is taken from
    #[serde(default)]
    pub severity_source: SeveritySource,

    /// Overall time budget for the run (default: 30 minutes)
    #[serde(default = "default_run_timeout", with = "duration_serde")]
    pub run_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            input: PathBuf::new(),
            output: default_output(),
            log: LogConfig::default(),
            api: ApiConfig::default(),
            rate_limit: RateLimitConfig::default(),
            columns: ColumnConfig::default(),
            severity_source: SeveritySource::default(),
            run_timeout: default_run_timeout(),
        }
    }
}

impl Config {
    /// Load settings from a JSON file
    ///
    /// Any field missing from the file takes its default value. The token is never
    /// read from the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid settings file {}: {}", path.display(), e),
            key: None,
        })
    }

    /// Check that required values are present and settings are usable
    ///
    /// All missing required flags are reported together.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.token.is_empty() {
            missing.push("token");
        }
        if self.input.as_os_str().is_empty() {
            missing.push("input");
        }
        if !missing.is_empty() {
            return Err(Error::Config {
                message: format!("required flag(s) not provided: {}", missing.join(", ")),
                key: Some(missing.join(",")),
            });
        }

        if self.output.as_os_str().is_empty() {
            return Err(Error::config("output", "output path must not be empty"));
        }

        self.api.base_url()?;

        if self.columns.repository.is_empty() || self.columns.alert_number.is_empty() {
            return Err(Error::config("columns", "column names must not be empty"));
        }

        if self.rate_limit.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "rate_limit.backoff_multiplier",
                "backoff multiplier must be at least 1.0",
            ));
        }

        if self.run_timeout.is_zero() {
            return Err(Error::config("run_timeout", "run timeout must be positive"));
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Append logs to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Debug-level logging plus progress and confirmation on stdout
    #[serde(default)]
    pub verbose: bool,
}

/// Remote API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST API root (default: "https://api.github.com")
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Value of the `X-GitHub-Api-Version` header
    #[serde(default = "default_api_version")]
    pub version: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            version: default_api_version(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Parsed API root, normalized to end with a slash so relative joins keep any path prefix
    pub fn base_url(&self) -> Result<url::Url> {
        let mut raw = self.url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = url::Url::parse(&raw)
            .map_err(|e| Error::config("api.url", format!("invalid API URL {:?}: {}", self.url, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::config(
                "api.url",
                format!("API URL {:?} cannot be used as a base", self.url),
            ));
        }
        Ok(url)
    }
}

/// Rate limit retry configuration
///
/// Waits triggered by an exhausted quota last exactly until the advertised reset time.
/// Waits for secondary limits without a reset hint use exponential backoff.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum number of rate-limit waits per alert before giving up (default: 5)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay for secondary limits without a hint (default: 60 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Upper bound for backoff delays (default: 15 minutes)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to backoff delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,

    /// Warn when remaining quota drops below this value (default: 10)
    #[serde(default = "default_low_quota_threshold")]
    pub low_quota_threshold: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
            low_quota_threshold: default_low_quota_threshold(),
        }
    }
}

/// Names of the input columns the report reads
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column holding `owner/name` (default: "Repository")
    #[serde(default = "default_repository_column")]
    pub repository: String,

    /// Column holding the alert number (default: "Alert Number")
    #[serde(default = "default_alert_number_column")]
    pub alert_number: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            repository: default_repository_column(),
            alert_number: default_alert_number_column(),
        }
    }
}

/// Source of the severity column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SeveritySource {
    /// `rule.security_severity_level` (critical, high, medium, low)
    #[default]
    SecuritySeverityLevel,
    /// `rule.severity` (none, note, warning, error)
    RuleSeverity,
}

fn default_output() -> PathBuf {
    PathBuf::from("codeql-report.csv")
}

fn default_run_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_api_version() -> String {
    "2022-11-28".to_string()
}

fn default_user_agent() -> String {
    concat!("codeql-report/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_low_quota_threshold() -> u32 {
    10
}

fn default_repository_column() -> String {
    "Repository".to_string()
}

fn default_alert_number_column() -> String {
    "Alert Number".to_string()
}

// Duration serialization helper (integer seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
