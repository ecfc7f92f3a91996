pub mod cli;
pub mod collector;
pub mod config;
pub mod history;
pub mod models;
pub mod reporting;

use std::sync::Once;

use thiserror::Error;

/// Top-level error type for ipa-results.
///
/// Every variant is terminal for the current invocation. Messages are what
/// the user sees, rendered red by [`reporting::Reporter::echo_error`].
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Unable to open results log file: {0}")]
    LogFile(#[source] std::io::Error),

    #[error("Unable to process results history log.")]
    HistoryLog(#[source] std::io::Error),

    #[error("The results file is not the proper json format.")]
    MalformedResults(#[source] serde_json::Error),

    #[error("The results json is missing key: '{0}'")]
    MissingKey(String),

    #[error("Unable to process results file: {0}")]
    ResultsFile(String),

    #[error("History item {item} does not exist ({count} entries).")]
    HistoryItem { item: usize, count: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl ReportError {
    /// Process exit code for this failure. All handled failures exit 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the stderr tracing subscriber.
///
/// Only active when `RUST_LOG` is set, e.g. `RUST_LOG=ipa_results=debug`.
/// Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_exits_one() {
        let errors = vec![
            ReportError::MissingKey("tests".into()),
            ReportError::ResultsFile("boom".into()),
            ReportError::HistoryItem { item: 3, count: 1 },
            ReportError::Config("bad".into()),
            ReportError::LogFile(std::io::Error::from(std::io::ErrorKind::NotFound)),
        ];
        for e in errors {
            assert_eq!(e.exit_code(), 1, "{e}");
        }
    }

    #[test]
    fn missing_key_message_names_the_key() {
        let e = ReportError::MissingKey("tests".into());
        assert_eq!(e.to_string(), "The results json is missing key: 'tests'");
    }

    #[test]
    fn malformed_message_is_fixed() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e = ReportError::MalformedResults(parse_err);
        assert!(e.to_string().contains("not the proper json format"));
    }
}
