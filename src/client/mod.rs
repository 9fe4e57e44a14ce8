//! Code scanning alert lookups against the GitHub REST API.
//!
//! [`AlertClient`] issues one authenticated `GET` per alert. Rate limiting is handled
//! inside the client: a rejected request is re-issued once the quota window opens
//! (or after the advertised/backoff delay), up to the configured retry budget, so
//! callers only ever see the final outcome.

mod payload;
mod rate;


pub use rate::RateState;

use crate::config::{Config, RateLimitConfig, SeveritySource};
use crate::error::{FetchError, Result};
use crate::retry::{RateLimitSignal, RetryDecision, RetryPolicy};
use crate::types::{Alert, AlertRef};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use payload::{AlertPayload, ErrorPayload};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Something that can resolve an alert reference into alert details
///
/// The report generator is written against this trait so that runs can be driven
/// by the real API client or by a canned source.
#[async_trait]
pub trait AlertSource: Send {
    /// Fetch one alert
    async fn fetch_alert(&mut self, target: &AlertRef) -> std::result::Result<Alert, FetchError>;
}

/// Outcome of a single request attempt
enum AttemptError {
    RateLimited(RateLimitSignal),
    Failed(FetchError),
}

impl From<FetchError> for AttemptError {
    fn from(e: FetchError) -> Self {
        AttemptError::Failed(e)
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(e: reqwest::Error) -> Self {
        AttemptError::Failed(FetchError::Network(e))
    }
}

/// GitHub code scanning client
pub struct AlertClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    api_version: String,
    rate_limit: RateLimitConfig,
    severity_source: SeveritySource,
    rate: RateState,
}

impl AlertClient {
    /// Build a client from the run configuration
    ///
    /// # Errors
    /// Returns error if the API URL is invalid or the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.api.base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .user_agent(config.api.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            api_version: config.api.version.clone(),
            rate_limit: config.rate_limit.clone(),
            severity_source: config.severity_source,
            rate: RateState::default(),
        })
    }

    /// Rate limit window as of the last response
    pub fn rate_state(&self) -> &RateState {
        &self.rate
    }

    fn alert_url(&self, target: &AlertRef) -> std::result::Result<Url, FetchError> {
        // Dot segments survive percent-encoding and would be resolved by `join`
        if [&target.owner, &target.repo]
            .iter()
            .any(|part| part.is_empty() || *part == "." || *part == "..")
        {
            return Err(FetchError::InvalidTarget(target.to_string()));
        }
        let relative = format!(
            "repos/{}/{}/code-scanning/alerts/{}",
            urlencoding::encode(&target.owner),
            urlencoding::encode(&target.repo),
            target.number
        );
        Ok(self.base_url.join(&relative)?)
    }

    async fn attempt(
        &mut self,
        url: &Url,
        target: &AlertRef,
    ) -> std::result::Result<AlertPayload, AttemptError> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", &self.api_version)
            .send()
            .await?;

        let status = response.status();
        let fresh = RateState::from_headers(response.headers());
        let retry_after = rate::retry_after(response.headers());
        if let Some(state) = &fresh {
            self.rate = state.clone();
        }

        if status.is_success() {
            let body = response.bytes().await?;
            return serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e).into());
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "Failed to read rejection body");
                String::new()
            }
        };
        let message = serde_json::from_str::<ErrorPayload>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        debug!(status = status.as_u16(), message = %message, "Alert request rejected");

        if let Some(signal) =
            classify_rate_limit(status, fresh.as_ref(), retry_after, &message, Utc::now())
        {
            return Err(AttemptError::RateLimited(signal));
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => FetchError::Unauthorized { message },
            StatusCode::FORBIDDEN => FetchError::Forbidden { message },
            StatusCode::NOT_FOUND => FetchError::NotFound {
                owner: target.owner.clone(),
                repo: target.repo.clone(),
                number: target.number,
            },
            other => FetchError::Status {
                status: other.as_u16(),
                message,
            },
        }
        .into())
    }

    async fn wait(&self, target: &AlertRef, signal: &RateLimitSignal, delay: Duration) {
        match signal {
            RateLimitSignal::QuotaExhausted { reset } => warn!(
                alert = %target,
                reset = %reset,
                delay_ms = delay.as_millis(),
                "GitHub rate limit reached, sleeping until reset"
            ),
            RateLimitSignal::RetryAfter(_) | RateLimitSignal::Secondary => warn!(
                alert = %target,
                delay_ms = delay.as_millis(),
                "GitHub secondary rate limit reached, backing off"
            ),
        }
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl AlertSource for AlertClient {
    async fn fetch_alert(&mut self, target: &AlertRef) -> std::result::Result<Alert, FetchError> {
        info!(alert = %target, "Fetching alert");
        let url = self.alert_url(target)?;
        let rate_limit = self.rate_limit.clone();
        let mut policy = RetryPolicy::new(&rate_limit);

        loop {
            match self.attempt(&url, target).await {
                Ok(payload) => {
                    if self.rate.is_low(rate_limit.low_quota_threshold) {
                        warn!(
                            resource = ?self.rate.resource,
                            remaining = ?self.rate.remaining,
                            used = ?self.rate.used,
                            reset = ?self.rate.reset,
                            "GitHub API rate limit low"
                        );
                    }
                    if policy.retries() > 0 {
                        info!(alert = %target, attempts = policy.retries() + 1, "Alert fetched after rate limit retry");
                    }
                    return Ok(payload.into_alert(target, self.severity_source));
                }
                Err(AttemptError::RateLimited(signal)) => {
                    match policy.next(&signal, Utc::now()) {
                        RetryDecision::Wait(delay) => self.wait(target, &signal, delay).await,
                        RetryDecision::GiveUp => {
                            return Err(FetchError::RateLimitExhausted {
                                attempts: policy.retries() + 1,
                            });
                        }
                    }
                }
                Err(AttemptError::Failed(e)) => return Err(e),
            }
        }
    }
}

/// Decide whether a rejected response is a rate-limit signal
///
/// Only 403 and 429 qualify. An explicit `retry-after` wins; otherwise a spent quota
/// with a reset time still in the future waits for the reset; otherwise a 429 or a
/// 403 whose message names a secondary rate limit falls back to backoff. A spent
/// quota whose reset has already passed is reported as a plain 403.
fn classify_rate_limit(
    status: StatusCode,
    rate: Option<&RateState>,
    retry_after: Option<Duration>,
    message: &str,
    now: DateTime<Utc>,
) -> Option<RateLimitSignal> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    if let Some(delay) = retry_after {
        return Some(RateLimitSignal::RetryAfter(delay));
    }

    if let Some(reset) = rate
        .filter(|state| state.is_exhausted())
        .and_then(|state| state.reset)
        .filter(|reset| *reset > now)
    {
        return Some(RateLimitSignal::QuotaExhausted { reset });
    }

    if status == StatusCode::TOO_MANY_REQUESTS
        || message.to_ascii_lowercase().contains("secondary rate limit")
    {
        return Some(RateLimitSignal::Secondary);
    }

    None
}
