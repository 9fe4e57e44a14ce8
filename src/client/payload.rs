//! Wire types for the code scanning "get alert" response
//!
//! Only the fields the report uses are modelled. Every field is optional on the wire;
//! absent text becomes an empty string and absent coordinates become zero.

use crate::config::SeveritySource;
use crate::types::{Alert, AlertRef};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlertPayload {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub rule: Option<RulePayload>,
    #[serde(default)]
    pub most_recent_instance: Option<InstancePayload>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RulePayload {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub security_severity_level: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InstancePayload {
    #[serde(default)]
    pub location: Option<LocationPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LocationPayload {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub start_line: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default)]
    pub start_column: Option<u32>,
    #[serde(default)]
    pub end_column: Option<u32>,
}

/// Error body returned with unsuccessful statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub message: String,
}

impl AlertPayload {
    /// Flatten into an [`Alert`] for the requested repository
    pub fn into_alert(self, target: &AlertRef, severity_source: SeveritySource) -> Alert {
        let rule = self.rule.unwrap_or_default();
        let location = self
            .most_recent_instance
            .and_then(|instance| instance.location)
            .unwrap_or_default();

        let severity = match severity_source {
            SeveritySource::SecuritySeverityLevel => rule.security_severity_level,
            SeveritySource::RuleSeverity => rule.severity,
        };

        Alert {
            owner: target.owner.clone(),
            repo: target.repo.clone(),
            id: self.number.unwrap_or(target.number),
            severity: severity.unwrap_or_default(),
            short_description: rule.description.unwrap_or_default(),
            full_description: rule.full_description.unwrap_or_default(),
            path: location.path.unwrap_or_default(),
            start_line: location.start_line.unwrap_or_default(),
            start_column: location.start_column.unwrap_or_default(),
            end_line: location.end_line.unwrap_or_default(),
            end_column: location.end_column.unwrap_or_default(),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "number": 3,
        "state": "open",
        "html_url": "https://github.com/octo/hello-world/security/code-scanning/3",
        "rule": {
            "id": "go/sql-injection",
            "severity": "error",
            "security_severity_level": "high",
            "description": "Database query built from user-controlled sources",
            "full_description": "Building a database query from user-controlled sources is vulnerable to insertion of malicious code by the user."
        },
        "most_recent_instance": {
            "ref": "refs/heads/main",
            "state": "open",
            "location": {
                "path": "src/main.go",
                "start_line": 10,
                "end_line": 12,
                "start_column": 1,
                "end_column": 5
            }
        }
    }"#;

    fn target() -> AlertRef {
        AlertRef {
            owner: "octo".into(),
            repo: "hello-world".into(),
            number: 3,
        }
    }

    #[test]
    fn maps_sample_response() {
        let payload: AlertPayload = serde_json::from_str(SAMPLE).unwrap();
        let alert = payload.into_alert(&target(), SeveritySource::SecuritySeverityLevel);

        assert_eq!(alert.owner, "octo");
        assert_eq!(alert.repo, "hello-world");
        assert_eq!(alert.id, 3);
        assert_eq!(alert.severity, "high");
        assert_eq!(
            alert.short_description,
            "Database query built from user-controlled sources"
        );
        assert!(alert.full_description.starts_with("Building a database query"));
        assert_eq!(alert.path, "src/main.go");
        assert_eq!(
            (alert.start_line, alert.start_column, alert.end_line, alert.end_column),
            (10, 1, 12, 5)
        );
    }

    #[test]
    fn rule_severity_source() {
        let payload: AlertPayload = serde_json::from_str(SAMPLE).unwrap();
        let alert = payload.into_alert(&target(), SeveritySource::RuleSeverity);
        assert_eq!(alert.severity, "error");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let payload: AlertPayload =
            serde_json::from_str(r#"{"number": 9, "rule": {"security_severity_level": null}}"#)
                .unwrap();
        let alert = payload.into_alert(&target(), SeveritySource::SecuritySeverityLevel);

        assert_eq!(alert.id, 9);
        assert_eq!(alert.severity, "");
        assert_eq!(alert.path, "");
        assert_eq!(alert.start_line, 0);
        assert_eq!(alert.end_column, 0);
    }

    #[test]
    fn error_body_message() {
        let body: ErrorPayload = serde_json::from_str(
            r#"{"message": "Not Found", "documentation_url": "https://docs.github.com"}"#,
        )
        .unwrap();
        assert_eq!(body.message, "Not Found");
    }
}
