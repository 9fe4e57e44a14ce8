//! Report generation
//!
//! [`ReportGenerator`] makes one sequential pass over the input rows. Rows that cannot
//! be parsed or fetched are recorded as [`RowFailure`]s and left out of the report;
//! only file-level problems, the run deadline, and cancellation abort the run.

use crate::client::AlertSource;
use crate::config::ColumnConfig;
use crate::error::{Error, Result, RowError};
use crate::tabular::{self, InputRow};
use crate::types::{AlertRef, REPORT_HEADER, ReportSummary, RowFailure};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Limits that abort a run as a whole
#[derive(Clone, Debug)]
pub struct RunLimits {
    /// Point in time after which no further fetch may complete
    pub deadline: Instant,
    /// Budget the deadline was derived from, for error reporting
    pub timeout: Duration,
    /// Cancelled on shutdown signals
    pub cancel: CancellationToken,
}

impl RunLimits {
    /// Limits starting now with the given time budget
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            timeout,
            cancel,
        }
    }
}

/// Rows accumulated for the report plus what happened along the way
#[derive(Debug, Default)]
pub struct Collected {
    /// Output rows matching [`REPORT_HEADER`], in input order
    pub records: Vec<Vec<String>>,
    /// Summary of the pass (`written` equals `records.len()`)
    pub summary: ReportSummary,
}

/// Drives alert lookups for every input row and writes the report
pub struct ReportGenerator<S> {
    source: S,
    columns: ColumnConfig,
    verbose: bool,
}

impl<S: AlertSource> ReportGenerator<S> {
    /// Create a generator over `source`
    ///
    /// With `verbose` set, per-row progress is printed to stdout.
    pub fn new(source: S, columns: ColumnConfig, verbose: bool) -> Self {
        Self {
            source,
            columns,
            verbose,
        }
    }

    /// The underlying alert source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Read `input`, fetch every alert, and write the report to `output`
    ///
    /// # Errors
    /// Fails on input/output file errors, when the deadline passes, or on cancellation.
    /// Per-row problems are reported in the returned summary instead.
    pub async fn generate(
        &mut self,
        input: &Path,
        output: &Path,
        limits: &RunLimits,
    ) -> Result<ReportSummary> {
        info!(path = %input.display(), "Reading input");
        let rows = tabular::read_rows(input)?;
        info!(count = rows.len(), "Found records to process");

        let collected = self.collect(&rows, limits).await?;

        tabular::write_rows(output, &REPORT_HEADER, &collected.records)?;
        info!(path = %output.display(), rows = collected.records.len(), "Report written");
        Ok(collected.summary)
    }

    /// Fetch every row's alert and build the report rows without writing them
    pub async fn collect(&mut self, rows: &[InputRow], limits: &RunLimits) -> Result<Collected> {
        self.warn_missing_columns(rows);

        let total = rows.len();
        let mut collected = Collected::default();
        collected.summary.total = total;

        for (index, row) in rows.iter().enumerate() {
            if self.verbose {
                println!("Processing record {}/{}", index + 1, total);
            }

            match self.process_row(row, limits).await? {
                Ok(record) => collected.records.push(record),
                Err(error) => {
                    warn!(row = index + 1, error = %error, "Skipping row");
                    collected.summary.failures.push(RowFailure {
                        row: index + 1,
                        error,
                    });
                }
            }
        }

        collected.summary.written = collected.records.len();
        info!(
            processed = collected.summary.written,
            total, "Successfully processed alerts"
        );
        if !collected.summary.failures.is_empty() {
            warn!(
                failed = collected.summary.failures.len(),
                "Failed to process alerts"
            );
        }
        Ok(collected)
    }

    /// Handle one row
    ///
    /// The outer `Result` is fatal for the run, the inner one only for this row.
    async fn process_row(
        &mut self,
        row: &InputRow,
        limits: &RunLimits,
    ) -> Result<std::result::Result<Vec<String>, RowError>> {
        let repository = row.get(&self.columns.repository).unwrap_or_default();
        let (owner, repo) = match parse_repository(repository) {
            Ok(parts) => parts,
            Err(e) => return Ok(Err(e)),
        };
        let raw_number = row.get(&self.columns.alert_number).unwrap_or_default();
        let number = match parse_alert_number(raw_number) {
            Ok(number) => number,
            Err(e) => return Ok(Err(e)),
        };

        let target = AlertRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        };

        let fetched = tokio::select! {
            biased;
            _ = limits.cancel.cancelled() => return Err(Error::Cancelled),
            res = tokio::time::timeout_at(limits.deadline, self.source.fetch_alert(&target)) => res,
        };

        match fetched {
            Err(_elapsed) => Err(Error::DeadlineExceeded {
                timeout: limits.timeout,
            }),
            Ok(Ok(alert)) => Ok(Ok(alert.to_record())),
            Ok(Err(source)) => Ok(Err(RowError::Fetch {
                repository: repository.trim().to_string(),
                number,
                source,
            })),
        }
    }

    fn warn_missing_columns(&self, rows: &[InputRow]) {
        let Some(first) = rows.first() else {
            return;
        };
        for column in [&self.columns.repository, &self.columns.alert_number] {
            if !first.has_column(column) {
                warn!(column = %column, "Input has no such column; every row will be skipped");
            }
        }
    }
}

/// Split `owner/name` into its two parts
///
/// Surrounding whitespace is ignored; there must be exactly one `/`, and neither part
/// may be empty, `.` or `..`.
pub fn parse_repository(value: &str) -> std::result::Result<(&str, &str), RowError> {
    let valid = |part: &str| !part.is_empty() && part != "." && part != "..";
    let trimmed = value.trim();
    let mut parts = trimmed.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if valid(owner) && valid(repo) => Ok((owner, repo)),
        _ => Err(RowError::InvalidRepository(value.to_string())),
    }
}

/// Parse an alert number (a non-negative integer, surrounding whitespace ignored)
pub fn parse_alert_number(value: &str) -> std::result::Result<u64, RowError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|source| RowError::InvalidAlertNumber {
            value: value.to_string(),
            source,
        })
}
