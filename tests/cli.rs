//! Tests that run the compiled `gh-codeql-report` binary

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{alert_json, report_lines, write_input};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gh_codeql_report(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gh-codeql-report"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn gh-codeql-report")
}

#[test]
fn missing_required_flags_exit_with_usage_error() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("logs/run.log");
    let output = dir.path().join("report.csv");

    let result = gh_codeql_report(&[
        "--output",
        output.to_str().unwrap(),
        "--log",
        log.to_str().unwrap(),
    ]);

    assert_eq!(result.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("Error: required flag(s) not provided: token, input"),
        "stderr was: {stderr}"
    );
    assert!(!output.exists());
    assert!(!log.exists());
}

#[test]
fn missing_token_alone_is_reported() {
    let result = gh_codeql_report(&["--input", "alerts.csv"]);

    assert_eq!(result.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("token"), "stderr was: {stderr}");
    assert!(!stderr.contains("input"), "stderr was: {stderr}");
}

#[test]
fn missing_input_file_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.csv");

    let result = gh_codeql_report(&[
        "--token",
        "ghp_test",
        "--input",
        dir.path().join("absent.csv").to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Error generating report:"));
    assert!(!output.exists());
}

#[tokio::test]
async fn verbose_run_prints_progress_and_writes_log_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello-world/code-scanning/alerts/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alert_json(3, "high", "src/main.go")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), &["octo/hello-world,3", "bad-format,5"]);
    let output = dir.path().join("report.csv");
    let log = dir.path().join("logs/run.log");
    let uri = server.uri();

    let args = vec![
        "--token".to_string(),
        "ghp_test".to_string(),
        "--input".to_string(),
        input.display().to_string(),
        "--output".to_string(),
        output.display().to_string(),
        "--log".to_string(),
        log.display().to_string(),
        "--api-url".to_string(),
        uri,
        "--verbose".to_string(),
    ];
    // The mock server lives on this runtime, so the blocking child runs elsewhere
    let result = tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        gh_codeql_report(&args)
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    assert!(stdout.contains("Processing record 1/2"));
    assert!(stdout.contains("Processing record 2/2"));
    assert!(stdout.contains(&format!("Report successfully generated at {}", output.display())));

    assert_eq!(report_lines(&output).len(), 2);

    let log_content = std::fs::read_to_string(&log).unwrap();
    assert!(log_content.contains("Starting gh-codeql-report"));
    assert!(log_content.contains("Skipping row"));
}
