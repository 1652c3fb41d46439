mod common;

use std::fs;
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use reorg_move::{attempt, relocate, MoveResult, ReorgError};
use tempfile::tempdir;
use walkdir::WalkDir;

use common::{capture_logs, write_file};

#[test]
fn file_move_creates_missing_destination_dirs() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let archive = tempdir()?;
    let src = work.path().join("report.txt");
    write_file(&src, "q3 numbers");
    let dest = archive.path().join("Finance").join("2023").join("report.txt");

    let moved = relocate(&src, &dest)?;

    assert_eq!(moved, dest);
    assert!(!src.exists(), "source should be gone");
    assert_eq!(fs::read_to_string(&dest)?, "q3 numbers");
    Ok(())
}

#[test]
fn directory_move_preserves_content_and_mtimes() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let archive = tempdir()?;
    let src = work.path().join("album");
    write_file(&src.join("track1.flac"), "one");
    write_file(&src.join("disc2").join("track2.flac"), "two");
    fs::create_dir_all(src.join("empty"))?;

    // Push mtimes well into the past so "now" can't match by accident.
    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(86_400 * 30));
    let mut before = Vec::new();
    for e in WalkDir::new(&src).min_depth(1) {
        let e = e?;
        if e.file_type().is_file() {
            set_file_mtime(e.path(), old)?;
            let rel = e.path().strip_prefix(&src)?.to_path_buf();
            before.push((rel, fs::read(e.path())?));
        }
    }

    let dest = archive.path().join("Music").join("album");
    relocate(&src, &dest)?;

    assert!(!src.exists(), "source directory should be removed");
    assert!(dest.join("empty").is_dir(), "empty subdirectory should be copied");
    for (rel, contents) in before {
        let moved = dest.join(&rel);
        assert_eq!(fs::read(&moved)?, contents, "content differs for {}", rel.display());
        let mtime = FileTime::from_last_modification_time(&fs::metadata(&moved)?);
        assert_eq!(mtime.unix_seconds(), old.unix_seconds(), "mtime differs for {}", rel.display());
    }
    Ok(())
}

#[test]
fn second_move_to_occupied_destination_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let work = tempdir()?;
    let archive = tempdir()?;
    let src = work.path().join("notes.txt");
    let dest = archive.path().join("Docs").join("notes.txt");
    write_file(&src, "new");
    write_file(&dest, "already here");

    for _ in 0..2 {
        let err = relocate(&src, &dest).unwrap_err();
        assert!(matches!(err, ReorgError::DestinationExists(ref p) if p == &dest), "{err:?}");
        assert!(err.is_skip());
    }
    assert_eq!(fs::read_to_string(&src)?, "new");
    assert_eq!(fs::read_to_string(&dest)?, "already here");
    assert_eq!(attempt(&src, &dest)?, MoveResult::SkippedDestinationExists);
    Ok(())
}

#[test]
fn missing_source_is_reported_and_nothing_is_created() {
    let work = tempdir().unwrap();
    let archive = tempdir().unwrap();
    let src = work.path().join("ghost.txt");
    let dest = archive.path().join("Cat").join("ghost.txt");

    let (res, logs) = capture_logs("info", || relocate(&src, &dest));

    assert!(matches!(res, Err(ReorgError::SourceNotFound(_))));
    assert!(!archive.path().join("Cat").exists(), "no destination dirs for a missing source");
    assert!(logs.contains("ghost.txt does not exist in"), "logs: {logs}");
    assert!(logs.contains("Move has been skipped"), "logs: {logs}");
}

#[test]
fn progress_lines_are_emitted_in_order() {
    let work = tempdir().unwrap();
    let archive = tempdir().unwrap();
    let src = work.path().join("report.txt");
    write_file(&src, "x");
    let dest = archive.path().join("Finance").join("report.txt");

    let (res, logs) = capture_logs("info", || relocate(&src, &dest));
    res.unwrap();

    let attempt_at = logs.find("Attempting to move report.txt...").expect("attempt line");
    let create_at = logs.find("Creating destination...").expect("create line");
    let done_at = logs.find("report.txt has been moved to").expect("done line");
    assert!(attempt_at < create_at && create_at < done_at, "logs: {logs}");
}

#[cfg(unix)]
#[test]
fn symlink_source_is_refused() {
    let work = tempdir().unwrap();
    let archive = tempdir().unwrap();
    let target = work.path().join("real.txt");
    write_file(&target, "x");
    let link = work.path().join("link.txt");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let err = relocate(&link, &archive.path().join("link.txt")).unwrap_err();
    assert!(matches!(err, ReorgError::UnsafeMove { .. }), "{err:?}");
    assert!(link.exists());
}

#[test]
fn directory_cannot_move_into_itself() {
    let work = tempdir().unwrap();
    let src = work.path().join("tree");
    write_file(&src.join("a.txt"), "a");

    let err = relocate(&src, &src.join("nested").join("tree")).unwrap_err();
    assert!(matches!(err, ReorgError::UnsafeMove { .. }), "{err:?}");
    assert!(src.join("a.txt").exists());
}

#[cfg(unix)]
fn make_fifo(path: &std::path::Path) {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    let c = CString::new(path.as_os_str().as_bytes()).unwrap();
    let rc = unsafe { libc::mkfifo(c.as_ptr(), 0o644) };
    assert_eq!(rc, 0, "mkfifo failed: {}", std::io::Error::last_os_error());
}

#[cfg(unix)]
#[test]
fn special_file_inside_directory_aborts_and_cleans_up() {
    let work = tempdir().unwrap();
    let archive = tempdir().unwrap();
    let src = work.path().join("proj");
    write_file(&src.join("a.txt"), "a");
    write_file(&src.join("nested").join("b.txt"), "b");
    make_fifo(&src.join("pipe"));
    let dest = archive.path().join("C").join("proj");

    let err = relocate(&src, &dest).unwrap_err();

    assert!(matches!(err, ReorgError::UnsafeMove { .. }), "{err:?}");
    assert!(!dest.exists(), "partial destination must be removed");
    assert!(src.join("a.txt").is_file());
    assert!(src.join("nested").join("b.txt").is_file());
    let pipe_meta = fs::symlink_metadata(src.join("pipe")).expect("pipe still in source");
    assert!(!pipe_meta.is_file() && !pipe_meta.is_dir());
}
