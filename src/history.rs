//! Results history log.
//!
//! The history log is a plain-text file with one results file path per line,
//! oldest first. Each results file has its run log next to it with a `.log`
//! extension.

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ReportError;

/// Returns the non-blank entries of the history log in file order.
pub fn read_entries(path: &Path) -> Result<Vec<String>, ReportError> {
    let content = fs::read_to_string(path).map_err(ReportError::HistoryLog)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Resolves the results file of the `item`-th most recent run (1 = latest).
pub fn resolve_entry(path: &Path, item: usize) -> Result<PathBuf, ReportError> {
    let entries = read_entries(path)?;
    let count = entries.len();
    if item == 0 || item > count {
        return Err(ReportError::HistoryItem { item, count });
    }
    let entry = &entries[count - item];
    debug!(item, entry = %entry, "resolved history entry");
    Ok(PathBuf::from(entry))
}

/// The run log written next to `results_file`.
pub fn log_path_for(results_file: &Path) -> PathBuf {
    results_file.with_extension("log")
}

/// Appends `results_file` to the history log, creating it if needed.
///
/// Relative paths are stored against the current directory so later
/// lookups work from anywhere. Entries must be valid UTF-8.
pub fn record(path: &Path, results_file: &Path) -> Result<(), ReportError> {
    let results_file = if results_file.is_absolute() {
        results_file.to_path_buf()
    } else {
        env::current_dir()
            .map_err(ReportError::HistoryLog)?
            .join(results_file)
    };
    let entry = results_file.to_str().ok_or_else(|| {
        ReportError::HistoryLog(io::Error::new(
            io::ErrorKind::InvalidData,
            "history entries must be UTF-8 paths",
        ))
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(ReportError::HistoryLog)?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(ReportError::HistoryLog)?;
    writeln!(file, "{entry}").map_err(ReportError::HistoryLog)?;
    debug!(path = %path.display(), results = %entry, "recorded history entry");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(lines: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".history");
        fs::write(&path, lines).unwrap();
        (dir, path)
    }

    #[test]
    fn entries_skip_blank_lines() {
        let (_dir, path) = history_with("/r/a.results\n\n  \n/r/b.results\n");
        assert_eq!(
            read_entries(&path).unwrap(),
            vec!["/r/a.results", "/r/b.results"]
        );
    }

    #[test]
    fn item_one_is_latest() {
        let (_dir, path) = history_with("/r/a.results\n/r/b.results\n/r/c.results\n");
        assert_eq!(resolve_entry(&path, 1).unwrap(), PathBuf::from("/r/c.results"));
        assert_eq!(resolve_entry(&path, 3).unwrap(), PathBuf::from("/r/a.results"));
    }

    #[test]
    fn item_out_of_range() {
        let (_dir, path) = history_with("/r/a.results\n");
        let err = resolve_entry(&path, 2).unwrap_err();
        assert!(matches!(err, ReportError::HistoryItem { item: 2, count: 1 }));
        assert!(matches!(
            resolve_entry(&path, 0).unwrap_err(),
            ReportError::HistoryItem { item: 0, .. }
        ));
    }

    #[test]
    fn missing_history_is_history_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_entries(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ReportError::HistoryLog(_)));
    }

    #[test]
    fn log_path_swaps_extension() {
        assert_eq!(
            log_path_for(Path::new("/tmp/ipa/ec2/ami-1/20240101.results")),
            PathBuf::from("/tmp/ipa/ec2/ami-1/20240101.log")
        );
    }

    #[test]
    fn record_appends_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/results/.history");
        record(&path, Path::new("/r/a.results")).unwrap();
        record(&path, Path::new("/r/b.results")).unwrap();
        assert_eq!(
            read_entries(&path).unwrap(),
            vec!["/r/a.results", "/r/b.results"]
        );
    }

    #[test]
    fn record_stores_relative_paths_as_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".history");
        record(&path, Path::new("runs/ec2.results")).unwrap();

        let expected = env::current_dir().unwrap().join("runs/ec2.results");
        let entries = read_entries(&path).unwrap();
        assert_eq!(entries, vec![expected.to_str().unwrap().to_string()]);
        assert_eq!(resolve_entry(&path, 1).unwrap(), expected);
    }

    #[cfg(unix)]
    #[test]
    fn record_rejects_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".history");
        let bad = Path::new(OsStr::from_bytes(b"/r/\xffrun.results"));
        let err = record(&path, bad).unwrap_err();
        assert!(matches!(err, ReportError::HistoryLog(_)));
        assert!(!path.exists());
    }
}
