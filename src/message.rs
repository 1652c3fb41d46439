//! Human-readable move and issue messages for logs and tickets.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::entry::{Entry, IssueKind};
use crate::paths::{display_name, shorten_from_common_ancestor, ShortenContext};

/// `moved {name} in {source parent} to {destination parent}`, with each parent
/// cut at the most specific ancestor it shares with the other one.
pub fn compose_move_message(source: &Path, destination: &Path) -> String {
    // After a move the source is gone; the destination tells us if it was a dir.
    let name = if destination.exists() {
        display_name(destination)
    } else {
        display_name(source)
    };
    let src_parent = parent_of(source);
    let dest_parent = parent_of(destination);
    let short_src = shorten_from_common_ancestor(&src_parent, &dest_parent, -1)
        .unwrap_or_else(|_| src_parent.clone());
    let short_dest = shorten_from_common_ancestor(&dest_parent, &src_parent, -1)
        .unwrap_or_else(|_| dest_parent.clone());
    format!(
        "moved {name} in {} to {}",
        short_src.display(),
        short_dest.display()
    )
}

/// `{IssueKind}: {name} in {parent}`.
///
/// With `shorten_paths` the parent is shortened through `context`; if no
/// context is supplied the raw parent is used and a warning is emitted.
pub fn compose_issue_message(
    entry: &Entry,
    source: &Path,
    shorten_paths: bool,
    context: Option<&ShortenContext>,
) -> String {
    let kind = entry.issue_kind().unwrap_or(IssueKind::Issue);
    let parent = parent_of(source);
    let shown = match (shorten_paths, context) {
        (false, _) => parent,
        (true, Some(ctx)) => ctx.apply(&parent),
        (true, None) => {
            warn!(entry = %entry.name, "path shortening requested without a context; using full paths");
            parent
        }
    };
    format!("{kind}: {} in {}", display_name(source), shown.display())
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}
