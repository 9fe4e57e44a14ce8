//! Rate limit retry policy
//!
//! The API reports three kinds of rate limiting, each mapped to a [`RateLimitSignal`]:
//! an exhausted primary quota with a reset timestamp, a secondary limit with a
//! `retry-after` hint, and a secondary limit without any hint. [`RetryPolicy`]
//! turns a signal into the delay before the identical request is re-issued, and
//! stops once the configured number of retries has been spent.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration as ChronoDuration, Utc};
//! use codeql_report::config::RateLimitConfig;
//! use codeql_report::retry::{RateLimitSignal, RetryDecision, RetryPolicy};
//!
//! let config = RateLimitConfig::default();
//! let mut policy = RetryPolicy::new(&config);
//!
//! let now = Utc::now();
//! let signal = RateLimitSignal::QuotaExhausted { reset: now + ChronoDuration::seconds(30) };
//! match policy.next(&signal, now) {
//!     RetryDecision::Wait(delay) => assert_eq!(delay.as_secs(), 30),
//!     RetryDecision::GiveUp => unreachable!(),
//! }
//! ```

use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

/// Why a request was rejected by the rate limiter
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitSignal {
    /// Primary quota is spent until `reset`
    QuotaExhausted {
        /// When the quota window resets
        reset: DateTime<Utc>,
    },
    /// Secondary limit with an explicit wait from the `retry-after` header
    RetryAfter(Duration),
    /// Secondary limit without a hint
    Secondary,
}

/// What to do after a rate-limit signal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given duration, then re-issue the request
    Wait(Duration),
    /// Retry budget is spent
    GiveUp,
}

/// Per-request retry state
///
/// Create one for every logical request; it counts the waits already taken and
/// tracks the current backoff delay.
#[derive(Debug)]
pub struct RetryPolicy<'a> {
    config: &'a RateLimitConfig,
    retries: u32,
    backoff: Duration,
}

impl<'a> RetryPolicy<'a> {
    /// Start a fresh budget for one logical request
    pub fn new(config: &'a RateLimitConfig) -> Self {
        Self {
            config,
            retries: 0,
            backoff: config.initial_delay,
        }
    }

    /// Number of waits granted so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Decide how long to wait before re-issuing the request
    ///
    /// A quota wait lasts until `reset` and is never shortened, so the retry cannot
    /// land before the window opens.
    pub fn next(&mut self, signal: &RateLimitSignal, now: DateTime<Utc>) -> RetryDecision {
        if self.retries >= self.config.max_retries {
            tracing::error!(
                retries = self.retries,
                max_retries = self.config.max_retries,
                "Rate limit retries exhausted"
            );
            return RetryDecision::GiveUp;
        }
        self.retries += 1;

        let delay = match signal {
            RateLimitSignal::QuotaExhausted { reset } => until(*reset, now),
            RateLimitSignal::RetryAfter(delay) => *delay,
            RateLimitSignal::Secondary => {
                let delay = if self.config.jitter {
                    add_jitter(self.backoff)
                } else {
                    self.backoff
                };
                let next = Duration::from_secs_f64(
                    self.backoff.as_secs_f64() * self.config.backoff_multiplier,
                );
                self.backoff = next.min(self.config.max_delay);
                delay.min(self.config.max_delay)
            }
        };

        tracing::debug!(
            retry = self.retries,
            max_retries = self.config.max_retries,
            delay_ms = delay.as_millis(),
            "Rate limit retry scheduled"
        );
        RetryDecision::Wait(delay)
    }
}

/// Time from `now` until `reset`, rounded up to the next millisecond
///
/// Returns zero when `reset` is not in the future.
pub fn until(reset: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let wait = (reset - now).to_std().unwrap_or(Duration::ZERO);
    let millis = wait.as_nanos().div_ceil(1_000_000);
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay.
/// This means the actual delay will be between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
