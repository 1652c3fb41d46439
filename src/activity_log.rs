//! Append-only change and error logs.
//!
//! Each line is `"<timestamp> --- <message>"`. Files are only ever opened in
//! append mode, so earlier lines are never rewritten or reordered.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Timestamp format used on every log line, e.g. `2021-03-27 14:47:00 -0500`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Append one `"{timestamp} --- {message}"` line to `log_path`, creating the
/// file (and its parent directory) when missing.
pub fn append(log_path: &Path, timestamp: &str, message: &str) -> io::Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "{timestamp} --- {}", message.trim_end_matches('\n'))?;
    file.flush()
}

/// The two logs a batch writes to.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    pub change_log: PathBuf,
    pub error_log: PathBuf,
}

impl ActivityLog {
    pub fn new(change_log: impl Into<PathBuf>, error_log: impl Into<PathBuf>) -> Self {
        Self {
            change_log: change_log.into(),
            error_log: error_log.into(),
        }
    }

    /// Record a completed move in the change log.
    pub fn record_move(&self, timestamp: &str, message: &str) -> io::Result<()> {
        append(&self.change_log, timestamp, message)
    }

    /// Record a flagged entry in the error log.
    pub fn record_issue(&self, timestamp: &str, message: &str) -> io::Result<()> {
        append(&self.error_log, timestamp, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_without_truncating() {
        let td = tempdir().unwrap();
        let log = td.path().join("logs").join("change.log");
        fs::create_dir_all(log.parent().unwrap()).unwrap();
        fs::write(&log, "existing line\n").unwrap();

        append(&log, "2021-03-27 14:47:00 -0500", "moved a.txt in w to r").unwrap();
        append(&log, "2021-03-27 14:48:00 -0500", "moved b.txt in w to r\n").unwrap();

        let contents = fs::read_to_string(&log).unwrap();
        assert_eq!(
            contents,
            "existing line\n\
             2021-03-27 14:47:00 -0500 --- moved a.txt in w to r\n\
             2021-03-27 14:48:00 -0500 --- moved b.txt in w to r\n"
        );
    }

    #[test]
    fn creates_missing_parent() {
        let td = tempdir().unwrap();
        let logs = ActivityLog::new(td.path().join("a/change.log"), td.path().join("b/error.log"));
        logs.record_issue("t", "Duplicate: x in y").unwrap();
        assert!(logs.error_log.exists());
        assert!(!logs.change_log.exists());
    }

    #[test]
    fn timestamp_shape() {
        let ts = timestamp_now();
        // "YYYY-MM-DD HH:MM:SS +HHMM"
        assert_eq!(ts.len(), 25, "{ts}");
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert!(ts[20..21] == *"+" || ts[20..21] == *"-", "{ts}");
    }
}
