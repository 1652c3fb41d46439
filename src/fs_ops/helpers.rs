//! I/O error helpers.
//!
//! Wraps io::Error into `ReorgError::Io` with the failing operation, the path
//! and a platform-aware hint, for use with `map_err`:
//!
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;

use std::io;
use std::path::Path;

use crate::errors::ReorgError;

/// Short actionable hint for common failure codes ("" when nothing useful applies).
fn hint_for(e: &io::Error) -> String {
    let mut hint = String::new();

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let text = match code {
                libc::EACCES | libc::EPERM => "; permission denied, check ownership and write permissions",
                libc::EXDEV => "; cross-filesystem, rename not possible",
                libc::EBUSY => "; resource busy, ensure no other process is using it",
                libc::ENOENT => "; path not found, verify it exists",
                libc::EEXIST => "; already exists",
                libc::ENOSPC => "; insufficient space on device",
                libc::EROFS => "; read-only filesystem",
                libc::ENAMETOOLONG => "; filename or path too long",
                _ => "",
            };
            hint.push_str(text);
        }
        #[cfg(windows)]
        {
            let text = match code {
                5 => "; access denied, check permissions",
                17 => "; not same device, cross-filesystem move",
                32 => "; sharing violation, file is in use",
                2 | 3 => "; path not found, verify it exists",
                80 => "; already exists",
                112 => "; insufficient disk space",
                206 => "; filename or path too long",
                _ => "",
            };
            hint.push_str(text);
        }
        hint.push_str(&format!(" [os code: {code}]"));
    } else {
        let text = match e.kind() {
            io::ErrorKind::PermissionDenied => "; permission denied",
            io::ErrorKind::NotFound => "; path not found",
            io::ErrorKind::AlreadyExists => "; already exists",
            _ => "",
        };
        hint.push_str(text);
    }

    hint
}

/// Closure for `.map_err(...)` turning an io::Error into `ReorgError::Io`.
pub(crate) fn io_error_with_help<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> ReorgError + 'a {
    move |e: io::Error| ReorgError::Io {
        op,
        path: path.to_path_buf(),
        hint: hint_for(&e),
        source: e,
    }
}
