//! gh-codeql-report binary entry point.

use clap::Parser;
use codeql_report::cli::Cli;
use codeql_report::{Error, logging};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Validate before the log subscriber opens any file
    let config = match cli.into_config().and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            report_startup_error(&e);
            return ExitCode::from(e.exit_code());
        }
    };

    if let Err(e) = logging::init_logging(&config.log) {
        report_startup_error(&e);
        return ExitCode::from(e.exit_code());
    }
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        "Starting gh-codeql-report"
    );

    let cancel = CancellationToken::new();
    tokio::spawn(codeql_report::cancel_on_signal(cancel.clone()));

    match codeql_report::run(&config, cancel).await {
        Ok(summary) => {
            info!(
                path = %config.output.display(),
                written = summary.written,
                skipped = summary.failures.len(),
                "Report successfully generated"
            );
            if config.log.verbose {
                println!("Report successfully generated at {}", config.output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Error generating report");
            eprintln!("Error generating report: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn report_startup_error(err: &Error) {
    match err {
        Error::Config { message, .. } => eprintln!("Error: {}", message),
        other => eprintln!("Error: {}", other),
    }
}
