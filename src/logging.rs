//! Log subscriber setup for the command-line tool
//!
//! The library only emits `tracing` events; the binary calls [`init_logging`] once at
//! startup to decide where they go.

use crate::config::LogConfig;
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the given verbosity
///
/// Verbose mode only raises this crate and its binary to `debug`; HTTP stack
/// internals stay at `info`.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "codeql_report=debug,gh_codeql_report=debug,info"
    } else {
        "info"
    }
}

/// Install the global subscriber
///
/// Uses `RUST_LOG` if set, otherwise `info` (or `debug` when verbose). Logs go to
/// stderr, or are appended to `config.file` (parent directories are created) without
/// ANSI colors and with source locations.
///
/// Must be called at most once per process.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(config.verbose)));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match &config.file {
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|source| Error::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        }
    };
    installed.map_err(|e| Error::Config {
        message: format!("failed to install log subscriber: {}", e),
        key: Some("log".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_valid_env_filter() {
        for verbose in [false, true] {
            assert!(
                EnvFilter::try_new(default_level(verbose)).is_ok(),
                "{} should be a valid filter",
                default_level(verbose)
            );
        }
        assert_eq!(default_level(false), "info");
    }

    #[test]
    fn verbose_level_is_scoped_to_this_crate() {
        let directive = default_level(true);
        assert!(directive.contains("codeql_report=debug"));
        assert!(directive.contains("gh_codeql_report=debug"));
        assert!(
            directive.split(',').all(|d| d != "debug"),
            "no global debug directive in {directive:?}"
        );
        assert!(directive.ends_with(",info"));
    }
}
