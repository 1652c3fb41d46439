//! Timestamp and permission preservation for copied items.
//! Best-effort: failures are logged and never turn a completed copy into an error.

use filetime::{set_file_times, FileTime};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Copy atime/mtime (and Unix mode bits) from `src_meta` onto `dest`.
pub(crate) fn preserve_times(dest: &Path, src_meta: &fs::Metadata) {
    let mt = FileTime::from_last_modification_time(src_meta);
    let at = FileTime::from_last_access_time(src_meta);
    if let Err(e) = set_file_times(dest, at, mt) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let src_mode = src_meta.permissions().mode() & 0o777;
        if let Err(e) = fs::set_permissions(dest, fs::Permissions::from_mode(src_mode)) {
            warn!(path = %dest.display(), mode = format!("{:o}", src_mode), error = %e, "failed to set permissions on destination");
        }
    }

    #[cfg(windows)]
    {
        if let Ok(meta) = fs::metadata(dest) {
            let mut perms = meta.permissions();
            perms.set_readonly(src_meta.permissions().readonly());
            let _ = fs::set_permissions(dest, perms);
        }
    }
}
