use std::str::FromStr;

use reorg_move::config::{default_data_dir, path_has_symlink_ancestor};
use reorg_move::{LogLevel, Settings};
use tempfile::tempdir;

#[test]
fn log_level_names_are_case_insensitive() {
    assert_eq!(LogLevel::parse("QUIET"), Some(LogLevel::Quiet));
    assert_eq!(LogLevel::parse("error"), Some(LogLevel::Quiet));
    assert_eq!(LogLevel::parse("Normal"), Some(LogLevel::Normal));
    assert_eq!(LogLevel::parse("verbose"), Some(LogLevel::Info));
    assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Debug));
    assert!(LogLevel::from_str("loud").is_err());
    for lvl in [LogLevel::Quiet, LogLevel::Normal, LogLevel::Info, LogLevel::Debug] {
        assert_eq!(LogLevel::from_str(&lvl.to_string()), Ok(lvl));
    }
}

#[test]
fn default_logs_live_in_the_data_dir() {
    let s = Settings::default();
    let data = default_data_dir();
    assert_eq!(s.change_log, data.join("change.log"));
    assert_eq!(s.error_log, data.join("error.log"));
    assert!(!s.require_cat2);
    assert_eq!(s.tracker.api_base, "https://api.trello.com/1");
}

#[test]
fn plain_directories_have_no_symlink_ancestor() {
    let td = tempdir().unwrap();
    // Canonical root: the temp dir itself may sit under a symlink (e.g. /var on macOS).
    let nested = td.path().canonicalize().unwrap().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();
    assert!(!path_has_symlink_ancestor(&nested.join("config.xml")).unwrap());
}

#[cfg(unix)]
#[test]
fn symlinked_parent_is_detected() {
    let td = tempdir().unwrap();
    let outside = tempdir().unwrap();
    let link = td.path().join("logs");
    std::os::unix::fs::symlink(outside.path(), &link).unwrap();
    assert!(path_has_symlink_ancestor(&link.join("reorg.log")).unwrap());
}
