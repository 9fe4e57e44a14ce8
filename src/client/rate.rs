//! Rate limit state reported by the API's `x-ratelimit-*` headers

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::time::Duration;

const LIMIT: &str = "x-ratelimit-limit";
const REMAINING: &str = "x-ratelimit-remaining";
const USED: &str = "x-ratelimit-used";
const RESET: &str = "x-ratelimit-reset";
const RESOURCE: &str = "x-ratelimit-resource";
const RETRY_AFTER: &str = "retry-after";

/// Last known rate limit window
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateState {
    /// Requests allowed per window
    pub limit: Option<u32>,
    /// Requests left in the current window
    pub remaining: Option<u32>,
    /// Requests already made in the current window
    pub used: Option<u32>,
    /// When the current window resets
    pub reset: Option<DateTime<Utc>>,
    /// Rate limit bucket the request was counted against (e.g. "code_scanning")
    pub resource: Option<String>,
}

impl RateState {
    /// Parse the rate limit headers of a response
    ///
    /// Returns `None` when the response carries none of them.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let state = Self {
            limit: header_number(headers, LIMIT),
            remaining: header_number(headers, REMAINING),
            used: header_number(headers, USED),
            reset: header_str(headers, RESET)
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            resource: header_str(headers, RESOURCE).map(str::to_string),
        };
        (state != Self::default()).then_some(state)
    }

    /// Whether the quota is known to be spent
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Whether the remaining quota is known and below `threshold`
    pub fn is_low(&self, threshold: u32) -> bool {
        self.remaining.is_some_and(|r| r < threshold)
    }
}

/// `retry-after` header as a delay (delta-seconds form only)
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER)
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u32> {
    header_str(headers, name).and_then(|v| v.parse().ok())
}
