//! Single-item relocation: existence checks, parent creation, dispatch to the
//! file or directory mover.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::ReorgError;
use crate::paths::{display_name, ShortenContext};

use super::dir_move::move_dir;
use super::file_move::move_file;
use super::helpers::io_error_with_help;

/// Outcome of one relocation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Moved(PathBuf),
    SkippedSourceMissing,
    SkippedDestinationExists,
}

/// Like [`relocate`], but folds the two expected skip conditions into
/// [`MoveResult`]. Any other failure is still returned as an error.
pub fn attempt(source: &Path, destination: &Path) -> Result<MoveResult, ReorgError> {
    match relocate(source, destination) {
        Ok(dest) => Ok(MoveResult::Moved(dest)),
        Err(ReorgError::SourceNotFound(_)) => Ok(MoveResult::SkippedSourceMissing),
        Err(ReorgError::DestinationExists(_)) => Ok(MoveResult::SkippedDestinationExists),
        Err(e) => Err(e),
    }
}

/// Move `source` (file or directory) to exactly `destination`, creating the
/// destination's parent directories when needed.
///
/// Fails without touching anything when the source is missing, when the
/// destination is already occupied, when the source is a symlink or special
/// file, or when the destination lies inside the source tree.
pub fn relocate(source: &Path, destination: &Path) -> Result<PathBuf, ReorgError> {
    let name = display_name(source);
    info!("Attempting to move {name}...");

    let meta = match fs::symlink_metadata(source) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let parent = source.parent().unwrap_or(source);
            warn!("{name} does not exist in {}. Move has been skipped", parent.display());
            return Err(ReorgError::SourceNotFound(source.to_path_buf()));
        }
        Err(e) => return Err(io_error_with_help("stat source", source)(e)),
    };

    if occupied(destination)? {
        let parent = destination.parent().unwrap_or(destination);
        warn!("{name} already exists in {}. Move has been skipped", parent.display());
        return Err(ReorgError::DestinationExists(destination.to_path_buf()));
    }

    let ftype = meta.file_type();
    if ftype.is_symlink() {
        return Err(ReorgError::unsafe_move(source, "source is a symlink"));
    }
    if !ftype.is_file() && !ftype.is_dir() {
        return Err(ReorgError::unsafe_move(
            source,
            "source is neither a regular file nor a directory",
        ));
    }
    if ftype.is_dir() && lies_within(destination, source) {
        return Err(ReorgError::unsafe_move(
            source,
            format!("destination {} is inside the source tree", destination.display()),
        ));
    }

    let parent = destination
        .parent()
        .ok_or_else(|| ReorgError::unsafe_move(destination, "destination has no parent directory"))?;
    if !parent.as_os_str().is_empty() && !parent.exists() {
        info!("Destination does not exist: {}. Creating destination...", parent.display());
        fs::create_dir_all(parent).map_err(io_error_with_help("create destination directory", parent))?;
    }

    debug!(src = %source.display(), dest = %destination.display(), is_dir = ftype.is_dir(), "dispatch relocate");
    if ftype.is_dir() {
        move_dir(source, destination)?;
    } else {
        move_file(source, destination)?;
    }

    let shown = ShortenContext::nearest_common(source).apply(parent);
    info!("{name} has been moved to {}", shown.display());
    Ok(destination.to_path_buf())
}

/// Anything at `path`, including a dangling symlink, counts as occupied.
fn occupied(path: &Path) -> Result<bool, ReorgError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error_with_help("stat destination", path)(e)),
    }
}

/// True when `candidate` equals or sits below `dir`, comparing resolved paths
/// where possible.
fn lies_within(candidate: &Path, dir: &Path) -> bool {
    let dir_real = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let mut existing = candidate.to_path_buf();
    let mut suffix = Vec::new();
    // Resolve the deepest existing ancestor, then re-attach the missing tail.
    while !existing.exists() {
        match (existing.file_name().map(|n| n.to_owned()), existing.parent()) {
            (Some(n), Some(p)) => {
                suffix.push(n);
                existing = p.to_path_buf();
            }
            _ => break,
        }
    }
    let mut resolved = dunce::canonicalize(&existing).unwrap_or(existing);
    for part in suffix.iter().rev() {
        resolved.push(part);
    }
    resolved.starts_with(&dir_real)
}
