//! Input files and API response bodies

use serde_json::json;
use std::path::{Path, PathBuf};

/// Header of the default input layout
pub const INPUT_HEADER: &str = "Repository,Alert Number";

/// Write an input CSV with the default header and the given `repository,number` lines
pub fn write_input(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("alerts.csv");
    let mut content = String::from(INPUT_HEADER);
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(&path, content).expect("write input csv");
    path
}

/// Code scanning alert body as returned by the API
pub fn alert_json(number: u64, severity: &str, path: &str) -> serde_json::Value {
    json!({
        "number": number,
        "state": "open",
        "html_url": format!("https://github.com/octo/hello-world/security/code-scanning/{number}"),
        "rule": {
            "id": "go/sql-injection",
            "severity": "error",
            "security_severity_level": severity,
            "description": "Database query built from user-controlled sources",
            "full_description": "Building a database query from user-controlled sources is vulnerable to insertion of malicious code by the user."
        },
        "tool": { "name": "CodeQL", "version": "2.15.0" },
        "most_recent_instance": {
            "ref": "refs/heads/main",
            "state": "open",
            "location": {
                "path": path,
                "start_line": 10,
                "end_line": 12,
                "start_column": 1,
                "end_column": 5
            }
        }
    })
}

/// Read the report file back as lines
pub fn report_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("read report")
        .lines()
        .map(str::to_string)
        .collect()
}
