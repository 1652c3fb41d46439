use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hidden temp sibling inside `dst_dir` used while a file copy is in flight.
pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!(".reorg_move.{pid}.{nanos}.tmp"))
}

pub(super) fn is_cross_device(e: &io::Error) -> bool {
    // No stable ErrorKind for EXDEV / ERROR_NOT_SAME_DEVICE; match raw codes.
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        #[cfg(windows)]
        Some(code) => code == 17,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}
