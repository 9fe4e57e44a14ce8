//! Core types shared between the fetch client and the report generator

use crate::error::RowError;
use std::fmt;

/// Column header of every generated report, in output order
pub const REPORT_HEADER: [&str; 11] = [
    "Org",
    "Repo",
    "Alert ID",
    "Severity",
    "Short Description",
    "Full Description",
    "File Path",
    "Start Line",
    "Start Column",
    "End Line",
    "End Column",
];

/// A code scanning alert resolved to its most recent location
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alert {
    /// Repository owner (organization or user)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Alert number within the repository
    pub id: u64,
    /// Severity label, taken from the configured severity source
    pub severity: String,
    /// Rule short description
    pub short_description: String,
    /// Rule full description
    pub full_description: String,
    /// File path of the most recent instance
    pub path: String,
    /// First line of the flagged region
    pub start_line: u32,
    /// First column of the flagged region
    pub start_column: u32,
    /// Last line of the flagged region
    pub end_line: u32,
    /// Last column of the flagged region
    pub end_column: u32,
}

impl Alert {
    /// Render the alert as a report row matching [`REPORT_HEADER`]
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.owner.clone(),
            self.repo.clone(),
            self.id.to_string(),
            self.severity.clone(),
            self.short_description.clone(),
            self.full_description.clone(),
            self.path.clone(),
            self.start_line.to_string(),
            self.start_column.to_string(),
            self.end_line.to_string(),
            self.end_column.to_string(),
        ]
    }
}

/// Identifies one alert to look up
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertRef {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Alert number
    pub number: u64,
}

impl fmt::Display for AlertRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// A skipped input row
#[derive(Debug)]
pub struct RowFailure {
    /// 1-based index of the data row (the header is not counted)
    pub row: usize,
    /// Why the row was skipped
    pub error: RowError,
}

/// Outcome of a completed report run
#[derive(Debug, Default)]
pub struct ReportSummary {
    /// Number of data rows read from the input
    pub total: usize,
    /// Number of rows written to the report
    pub written: usize,
    /// Rows that were skipped, in input order
    pub failures: Vec<RowFailure>,
}

impl ReportSummary {
    /// Whether every input row made it into the report
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_follows_header_order() {
        let alert = Alert {
            owner: "octo".into(),
            repo: "hello-world".into(),
            id: 3,
            severity: "high".into(),
            short_description: "SQL injection".into(),
            full_description: "Building a SQL query from user input".into(),
            path: "src/main.go".into(),
            start_line: 10,
            start_column: 1,
            end_line: 12,
            end_column: 5,
        };

        let record = alert.to_record();
        assert_eq!(record.len(), REPORT_HEADER.len());
        assert_eq!(
            record,
            vec![
                "octo",
                "hello-world",
                "3",
                "high",
                "SQL injection",
                "Building a SQL query from user input",
                "src/main.go",
                "10",
                "1",
                "12",
                "5",
            ]
        );
    }

    #[test]
    fn alert_ref_displays_as_owner_repo_number() {
        let alert = AlertRef {
            owner: "octo".into(),
            repo: "hello-world".into(),
            number: 42,
        };
        assert_eq!(alert.to_string(), "octo/hello-world#42");
    }

    #[test]
    fn summary_completeness() {
        let mut summary = ReportSummary {
            total: 1,
            written: 1,
            failures: Vec::new(),
        };
        assert!(summary.is_complete());

        summary.failures.push(RowFailure {
            row: 1,
            error: RowError::InvalidRepository("bad".into()),
        });
        assert!(!summary.is_complete());
    }
}
