//! Results file collection.
//!
//! Reads a JSON results file and turns it into a [`ResultRecord`]. Malformed
//! JSON and missing keys are reported as distinct [`ReportError`] kinds so
//! the caller can tell the user what is wrong with the file.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::models::ResultRecord;
use crate::ReportError;

/// Top-level keys every results file must carry.
const REQUIRED_KEYS: [&str; 3] = ["summary", "info", "tests"];

/// Keys every entry of `tests` must carry.
const REQUIRED_TEST_KEYS: [&str; 2] = ["name", "outcome"];

/// Reads and parses the results file at `path`.
pub fn collect_results(path: &Path) -> Result<ResultRecord, ReportError> {
    debug!(path = %path.display(), "reading results file");
    let content =
        fs::read_to_string(path).map_err(|e| ReportError::ResultsFile(e.to_string()))?;
    parse_results(&content)
}

/// Parses results JSON that has already been read into memory.
pub fn parse_results(content: &str) -> Result<ResultRecord, ReportError> {
    let value: Value = serde_json::from_str(content).map_err(ReportError::MalformedResults)?;
    check_required_keys(&value)?;
    serde_json::from_value(value).map_err(|e| ReportError::ResultsFile(e.to_string()))
}

/// Returns the first required key that is absent.
fn check_required_keys(value: &Value) -> Result<(), ReportError> {
    let Some(obj) = value.as_object() else {
        return Err(ReportError::MissingKey(REQUIRED_KEYS[0].to_string()));
    };
    if let Some(key) = REQUIRED_KEYS.iter().find(|k| !obj.contains_key(**k)) {
        return Err(ReportError::MissingKey((*key).to_string()));
    }

    // A non-array `tests` is a type error, reported by deserialization.
    if let Some(tests) = obj.get("tests").and_then(Value::as_array) {
        for test in tests {
            let missing = REQUIRED_TEST_KEYS
                .iter()
                .find(|k| test.get(**k).is_none());
            if let Some(key) = missing {
                return Err(ReportError::MissingKey((*key).to_string()));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{
        "summary": {"num_tests": 2, "passed": 1, "failed": 1, "duration": 3.2},
        "info": {"platform": "azure", "region": "westus"},
        "tests": [
            {"name": "tests/test_sles.py::test_sles_license", "outcome": "passed"},
            {"name": "tests/test_sles.py::test_sles_hostname", "outcome": "failed"}
        ]
    }"#;

    #[test]
    fn parses_valid_results() {
        let record = parse_results(VALID).unwrap();
        assert_eq!(record.summary.num_tests, 2);
        assert_eq!(record.summary.failed, 1);
        assert_eq!(record.summary.error, 0);
        assert_eq!(record.info.len(), 2);
        assert_eq!(record.tests.len(), 2);
        assert_eq!(record.tests[1].outcome, "failed");
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_results("{ not json").unwrap_err();
        assert!(matches!(err, ReportError::MalformedResults(_)), "{err:?}");
    }

    #[test]
    fn empty_file_is_malformed() {
        let err = parse_results("").unwrap_err();
        assert!(matches!(err, ReportError::MalformedResults(_)), "{err:?}");
    }

    #[test]
    fn missing_tests_key_is_reported() {
        let err = parse_results(r#"{"summary": {}, "info": {}}"#).unwrap_err();
        match err {
            ReportError::MissingKey(key) => assert_eq!(key, "tests"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn missing_summary_reported_first() {
        let err = parse_results(r#"{"tests": []}"#).unwrap_err();
        assert!(matches!(err, ReportError::MissingKey(ref k) if k == "summary"));
    }

    #[test]
    fn non_object_top_level_is_missing_summary() {
        let err = parse_results("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ReportError::MissingKey(ref k) if k == "summary"));
    }

    #[test]
    fn test_without_outcome_is_missing_key() {
        let err = parse_results(
            r#"{"summary": {}, "info": {}, "tests": [{"name": "test_a.py"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::MissingKey(ref k) if k == "outcome"));
    }

    #[test]
    fn wrong_counter_type_is_results_error() {
        let err = parse_results(
            r#"{"summary": {"passed": "two"}, "info": {}, "tests": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::ResultsFile(_)), "{err:?}");
    }

    #[test]
    fn unreadable_file_is_results_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_results(&dir.path().join("nope.results")).unwrap_err();
        assert!(matches!(err, ReportError::ResultsFile(_)), "{err:?}");
    }

    #[test]
    fn collects_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let record = collect_results(file.path()).unwrap();
        assert_eq!(record.summary.passed, 1);
    }
}
