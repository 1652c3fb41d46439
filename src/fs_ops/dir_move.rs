//! Directory move implementation.
//! Copies the whole tree (timestamps preserved) and removes the source only
//! once the copy is complete. Directory trees are always copied rather than
//! renamed so the same code path works across filesystems.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::ReorgError;

use super::file_move::copy_file_into_place;
use super::helpers::io_error_with_help;
use super::metadata::preserve_times;

/// Move directory `src_dir` to `target`. `target` must not exist yet; its
/// parent must.
pub(super) fn move_dir(src_dir: &Path, target: &Path) -> Result<(), ReorgError> {
    if let Err(e) = copy_tree(src_dir, target) {
        // Never leave a half-built destination behind; the source is untouched.
        if let Err(cleanup) = fs::remove_dir_all(target) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                warn!(path = %target.display(), error = %cleanup, "failed to clean up partial destination");
            }
        }
        return Err(e);
    }

    if let Err(e) = fs::remove_dir_all(src_dir) {
        // The destination is complete at this point; report the leftover source
        // instead of failing a move whose data is already in place.
        warn!(
            src = %src_dir.display(),
            dest = %target.display(),
            error = %e,
            "Copied directory but could not fully remove the source; remove it manually"
        );
    }
    debug!(src = %src_dir.display(), dest = %target.display(), "Copied directory tree and removed source");
    Ok(())
}

/// Recursively copy `src_dir` into a new directory `target`, preserving file
/// and directory modification times.
pub fn copy_tree(src_dir: &Path, target: &Path) -> Result<(), ReorgError> {
    let root_meta = fs::metadata(src_dir).map_err(io_error_with_help("stat source directory", src_dir))?;
    fs::create_dir(target).map_err(io_error_with_help("create directory", target))?;

    // Directory times are applied last: writing children bumps a parent's mtime.
    let mut dirs: Vec<(PathBuf, fs::Metadata)> = Vec::new();

    for item in WalkDir::new(src_dir).min_depth(1).follow_links(false) {
        let item = item.map_err(|e| {
            let path = e.path().unwrap_or(src_dir).to_path_buf();
            ReorgError::Io {
                op: "walk source directory",
                path,
                hint: String::new(),
                source: io::Error::from(e),
            }
        })?;
        let Ok(rel) = item.path().strip_prefix(src_dir) else {
            continue;
        };
        let dst = target.join(rel);
        let ftype = item.file_type();

        if ftype.is_dir() {
            fs::create_dir(&dst).map_err(io_error_with_help("create directory", &dst))?;
            let meta = item
                .metadata()
                .map_err(|e| io_error_with_help("stat directory", item.path())(io::Error::from(e)))?;
            dirs.push((dst, meta));
        } else if ftype.is_file() {
            copy_file_into_place(item.path(), &dst)?;
        } else if ftype.is_symlink() {
            copy_symlink(item.path(), &dst)?;
        } else {
            // Sockets, FIFOs and device nodes can't be copied; abort so the source survives.
            return Err(ReorgError::unsafe_move(
                item.path(),
                "special file inside the directory cannot be copied",
            ));
        }
    }

    for (dir, meta) in dirs.iter().rev() {
        preserve_times(dir, meta);
    }
    preserve_times(target, &root_meta);
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, dst: &Path) -> Result<(), ReorgError> {
    let points_to = fs::read_link(link).map_err(io_error_with_help("read symlink", link))?;
    std::os::unix::fs::symlink(&points_to, dst).map_err(io_error_with_help("create symlink", dst))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, dst: &Path) -> Result<(), ReorgError> {
    // Without portable symlink creation, copy what the link points to.
    fs::copy(link, dst)
        .map(|_| ())
        .map_err(io_error_with_help("copy symlink target", dst))
}
