//! Path shortening for log lines and ticket titles.
//!
//! Two strategies:
//! - `shorten`: cut a path at the first component named like a reference basis.
//! - `shorten_from_common_ancestor`: cut a path at a chosen element of the
//!   positional prefix it shares with another path.
//!
//! Both are display helpers; callers fall back to the raw path when they fail.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShortenError {
    #[error("ancestor index {index} out of range for {shared} shared path segment(s)")]
    IndexOutOfRange { index: isize, shared: usize },
}

/// How a path should be shortened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenContext {
    /// Start at the first component equal to this name.
    Basis(String),
    /// Start at `index` within the prefix shared with `reference`.
    CommonAncestor { reference: PathBuf, index: isize },
}

impl ShortenContext {
    /// Most specific common ancestor with `reference`.
    pub fn nearest_common(reference: impl Into<PathBuf>) -> Self {
        ShortenContext::CommonAncestor {
            reference: reference.into(),
            index: -1,
        }
    }

    /// Apply this context, falling back to `path` itself on failure.
    pub fn apply(&self, path: &Path) -> PathBuf {
        match self {
            ShortenContext::Basis(name) => shorten(path, name),
            ShortenContext::CommonAncestor { reference, index } => {
                shorten_from_common_ancestor(path, reference, *index)
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        }
    }
}

/// Suffix of `full_path` starting at the first component equal to `basis`.
/// Returns `full_path` unchanged when no component matches.
pub fn shorten(full_path: &Path, basis: &str) -> PathBuf {
    let parts: Vec<Component<'_>> = full_path.components().collect();
    match parts.iter().position(|c| c.as_os_str() == basis) {
        Some(start) => parts[start..].iter().collect(),
        None => full_path.to_path_buf(),
    }
}

/// Subpath of `main` starting at element `index` of the positional prefix
/// shared by `main` and `compare`. Negative indices count from the end.
pub fn shorten_from_common_ancestor(
    main: &Path,
    compare: &Path,
    index: isize,
) -> Result<PathBuf, ShortenError> {
    let parts: Vec<Component<'_>> = main.components().collect();
    let shared = parts
        .iter()
        .zip(compare.components())
        .take_while(|(a, b)| **a == *b)
        .count();

    let resolved = if index < 0 {
        shared.checked_sub(index.unsigned_abs())
    } else if (index as usize) < shared {
        Some(index as usize)
    } else {
        None
    };

    match resolved {
        Some(start) => Ok(parts[start..].iter().collect()),
        None => Err(ShortenError::IndexOutOfRange { index, shared }),
    }
}

/// Name of the item at `path`; directories are wrapped in separators
/// (`/name/`) so they stand out from files in logs and tickets.
pub fn display_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    if path.is_dir() {
        format!("{MAIN_SEPARATOR}{name}{MAIN_SEPARATOR}")
    } else {
        name
    }
}
