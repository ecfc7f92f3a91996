//! ANSI-colored terminal reporter.
//!
//! Writes results, logs, and history to any [`Write`] sink. Color is
//! controlled per call by `no_color`; nothing here reads global state.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::collector::collect_results;
use crate::models::{Color, ResultRecord};
use crate::ReportError;

const RESET: &str = "\x1b[0m";

/// Renders test artifacts as line-oriented text.
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Reporter::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Reporter { out }
    }

    /// Returns the underlying sink (used by tests to inspect output).
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.out.flush()?;
        Ok(())
    }

    /// Writes `message` followed by a newline.
    pub fn echo(&mut self, message: &str) -> Result<(), ReportError> {
        writeln!(self.out, "{message}")?;
        Ok(())
    }

    /// Writes `message` in `color`, or plain when `no_color` is set.
    pub fn echo_style(
        &mut self,
        message: &str,
        no_color: bool,
        color: Color,
    ) -> Result<(), ReportError> {
        if no_color {
            self.echo(message)
        } else {
            writeln!(self.out, "{}{message}{RESET}", color.ansi())?;
            Ok(())
        }
    }

    /// Writes the error's message in red.
    pub fn echo_error(&mut self, error: &ReportError, no_color: bool) -> Result<(), ReportError> {
        self.echo_style(&error.to_string(), no_color, Color::Red)
    }

    /// Echoes a results log file verbatim.
    pub fn echo_log(&mut self, path: &Path) -> Result<(), ReportError> {
        debug!(path = %path.display(), "reading results log");
        let content = fs::read_to_string(path).map_err(ReportError::LogFile)?;
        self.echo(&content)
    }

    /// Prints the nagios-style summary line, then per-test detail if
    /// `verbose`.
    pub fn echo_results(
        &mut self,
        record: &ResultRecord,
        no_color: bool,
        verbose: bool,
    ) -> Result<(), ReportError> {
        let summary = &record.summary;
        self.echo_style(&summary.nagios_line(), no_color, summary.status().color())?;

        if verbose {
            self.echo_verbose_results(record, no_color)?;
        }
        Ok(())
    }

    /// Collects the results file at `path` and prints it via
    /// [`Reporter::echo_results`].
    pub fn echo_results_file(
        &mut self,
        path: &Path,
        no_color: bool,
        verbose: bool,
    ) -> Result<(), ReportError> {
        let record = collect_results(path)?;
        self.echo_results(&record, no_color, verbose)
    }

    /// Prints the `info` block and one colored line per test.
    pub fn echo_verbose_results(
        &mut self,
        record: &ResultRecord,
        no_color: bool,
    ) -> Result<(), ReportError> {
        self.echo("")?;
        self.echo(&record.info_lines().join("\n"))?;
        self.echo("")?;

        for test in &record.tests {
            let color = if test.passed() {
                Color::Green
            } else {
                Color::Red
            };
            self.echo_style(&test.display_line(), no_color, color)?;
        }
        Ok(())
    }

    /// Replays the history log verbatim.
    pub fn results_history(&mut self, path: &Path) -> Result<(), ReportError> {
        debug!(path = %path.display(), "reading results history");
        let content = fs::read_to_string(path).map_err(ReportError::HistoryLog)?;
        self.echo(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
