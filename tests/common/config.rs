//! Test configuration helpers for mock and live API runs

use codeql_report::config::{ApiConfig, RateLimitConfig};
use codeql_report::Config;
use std::path::Path;
use std::time::Duration;

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Retry settings that keep rate limit tests fast
pub fn fast_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        max_retries: 3,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        jitter: false,
        low_quota_threshold: 10,
    }
}

/// Run configuration pointing at a mock API root
pub fn mock_config(api_url: &str, input: &Path, output: &Path) -> Config {
    Config {
        token: "ghp_test".into(),
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        api: ApiConfig {
            url: api_url.to_string(),
            ..ApiConfig::default()
        },
        rate_limit: fast_rate_limit(),
        run_timeout: Duration::from_secs(30),
        ..Config::default()
    }
}

/// Live API target loaded from environment variables
///
/// Required environment variables:
/// - `GITHUB_TOKEN` - Token with `security_events` read access
/// - `CODEQL_REPO` - Repository in `owner/name` form
/// - `CODEQL_ALERT` - Number of an existing code scanning alert
///
/// Optional environment variables:
/// - `GITHUB_API_URL` - API root (default: https://api.github.com)
pub struct LiveTarget {
    /// Access token
    pub token: String,
    /// `owner/name`
    pub repository: String,
    /// Alert number
    pub alert: u64,
    /// API root
    pub api_url: String,
}

/// Load the live target from `.env` / the environment
pub fn load_live_target() -> Result<LiveTarget, ConfigError> {
    dotenvy::dotenv().ok();

    let token = std::env::var("GITHUB_TOKEN")
        .map_err(|_| ConfigError("GITHUB_TOKEN not set in environment".to_string()))?;

    let repository = std::env::var("CODEQL_REPO")
        .map_err(|_| ConfigError("CODEQL_REPO not set in environment".to_string()))?;

    let alert = std::env::var("CODEQL_ALERT")
        .map_err(|_| ConfigError("CODEQL_ALERT not set in environment".to_string()))?
        .parse()
        .map_err(|e| ConfigError(format!("CODEQL_ALERT is not a number: {e}")))?;

    let api_url =
        std::env::var("GITHUB_API_URL").unwrap_or_else(|_| "https://api.github.com".to_string());

    Ok(LiveTarget {
        token,
        repository,
        alert,
        api_url,
    })
}

/// Whether live credentials are available
pub fn has_live_credentials() -> bool {
    load_live_target().is_ok()
}
