use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Overall outcome of a test run, as shown at the start of the summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Status::Passed => Color::Green,
            Status::Failed => Color::Red,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Foreground colors used by the terminal reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    Red,
    Green,
    #[default]
    Yellow,
}

impl Color {
    /// ANSI escape sequence that switches the foreground to this color.
    pub fn ansi(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
        }
    }
}

// ---------------------------------------------------------------------------
// ResultSummary
// ---------------------------------------------------------------------------

/// Counters from the `summary` object of a results file.
///
/// Absent counters deserialize to 0. Any other summary keys (`duration`,
/// `skipped`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultSummary {
    #[serde(default)]
    pub num_tests: u64,
    #[serde(default)]
    pub passed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub error: u64,
}

impl ResultSummary {
    pub fn status(&self) -> Status {
        if self.failed > 0 || self.error > 0 {
            Status::Failed
        } else {
            Status::Passed
        }
    }

    /// Nagios-style line: `<STATUS> tests=<n>|pass=<p>|fail=<f>|error=<e>`.
    pub fn nagios_line(&self) -> String {
        format!(
            "{} tests={}|pass={}|fail={}|error={}",
            self.status(),
            self.num_tests,
            self.passed,
            self.failed,
            self.error
        )
    }
}

// ---------------------------------------------------------------------------
// TestCase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestCase {
    /// Test node id, e.g. `tests/test_sles.py::test_sles_license`.
    pub name: String,
    pub outcome: String,
}

impl TestCase {
    pub fn passed(&self) -> bool {
        self.outcome == "passed"
    }

    /// Name shown in verbose output: the last path segment of the module
    /// with its `.py` extension dropped. Anything after `::` is kept as is.
    pub fn display_name(&self) -> String {
        let (module, rest) = match self.name.split_once("::") {
            Some((module, rest)) => (module, Some(rest)),
            None => (self.name.as_str(), None),
        };
        let file = module.rsplit('/').next().unwrap_or(module);
        let stem = file.strip_suffix(".py").unwrap_or(file);
        match rest {
            Some(rest) => format!("{stem}::{rest}"),
            None => stem.to_string(),
        }
    }

    /// `<display name> <OUTCOME>`
    pub fn display_line(&self) -> String {
        format!("{} {}", self.display_name(), self.outcome.to_uppercase())
    }
}

// ---------------------------------------------------------------------------
// ResultRecord
// ---------------------------------------------------------------------------

/// A parsed results file. Produced by [`crate::collector::collect_results`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultRecord {
    pub summary: ResultSummary,
    /// Run metadata (platform, image, region, ...) in file order.
    pub info: Map<String, Value>,
    pub tests: Vec<TestCase>,
}

impl ResultRecord {
    /// `<key>: <val>` lines for the `info` block, in file order.
    pub fn info_lines(&self) -> Vec<String> {
        self.info
            .iter()
            .map(|(key, val)| format!("{key}: {}", display_value(val)))
            .collect()
    }
}

/// Strings render bare; everything else as compact JSON.
fn display_value(val: &Value) -> String {
    match val {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
