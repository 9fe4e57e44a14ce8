//! # codeql-report
//!
//! Generate an enriched CSV report of GitHub code scanning alerts.
//!
//! The input is a CSV listing repositories (`owner/name`) and alert numbers. For every
//! row the alert is fetched from the code scanning REST API and flattened into one
//! report row with severity, rule descriptions and the location of the most recent
//! instance. Rows that cannot be parsed or fetched are logged and skipped; the report
//! is written as long as the input can be read and the output can be written.
//!
//! ## Quick Start
//!
//! ```no_run
//! use codeql_report::{Config, run};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         token: std::env::var("GITHUB_TOKEN")?,
//!         input: "alerts.csv".into(),
//!         output: "codeql-report.csv".into(),
//!         ..Default::default()
//!     };
//!     config.validate()?;
//!
//!     let summary = run(&config, CancellationToken::new()).await?;
//!     println!("{}/{} alerts written", summary.written, summary.total);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Command-line flags
pub mod cli;
/// Code scanning API client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Log subscriber setup
pub mod logging;
/// Report generation
pub mod report;
/// Rate limit retry policy
pub mod retry;
/// CSV input and output
pub mod tabular;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::{AlertClient, AlertSource, RateState};
pub use config::{Config, RateLimitConfig, SeveritySource};
pub use error::{Error, FetchError, Result, RowError};
pub use report::{ReportGenerator, RunLimits};
pub use types::{Alert, AlertRef, REPORT_HEADER, ReportSummary, RowFailure};

use tokio_util::sync::CancellationToken;

/// Generate the report described by `config` against the live API
///
/// `config` should already have passed [`Config::validate`]. The run is bounded by
/// `config.run_timeout` and aborts when `cancel` fires.
pub async fn run(config: &Config, cancel: CancellationToken) -> Result<ReportSummary> {
    let client = AlertClient::new(config)?;
    let mut generator = ReportGenerator::new(client, config.columns.clone(), config.log.verbose);
    let limits = RunLimits::new(config.run_timeout, cancel);

    let summary = generator
        .generate(&config.input, &config.output, &limits)
        .await?;

    let rate = generator.source().rate_state();
    tracing::debug!(
        resource = ?rate.resource,
        remaining = ?rate.remaining,
        used = ?rate.used,
        limit = ?rate.limit,
        reset = ?rate.reset,
        "Final rate limit state"
    );
    Ok(summary)
}

/// Cancel `token` when a termination signal arrives
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn cancel_on_signal(token: CancellationToken) {
    wait_for_signal().await;
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
