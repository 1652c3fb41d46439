//! Entry records handed to the batch processor and the issue-kind table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::errors::ReorgError;

/// Kind of issue a flagged entry reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Duplicate,
    Unclear,
    Misplaced,
    Unnecessary,
    Issue,
}

impl IssueKind {
    /// Map a flag to its issue kind. Only the empty flag carries no issue;
    /// any other value, whitespace included, is at least an `Issue`.
    pub fn from_flag(flag: &str) -> Option<Self> {
        if flag.is_empty() {
            return None;
        }
        match flag.trim() {
            "d" => Some(IssueKind::Duplicate),
            "u" => Some(IssueKind::Unclear),
            "m" => Some(IssueKind::Misplaced),
            "n" => Some(IssueKind::Unnecessary),
            _ => Some(IssueKind::Issue),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::Duplicate => "Duplicate",
            IssueKind::Unclear => "Unclear",
            IssueKind::Misplaced => "Misplaced",
            IssueKind::Unnecessary => "Unnecessary",
            IssueKind::Issue => "Issue",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of work: an item in the working directory plus where it goes,
/// or why it was flagged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    pub name: String,
    pub flag: String,
    pub cat1: String,
    pub cat2: String,
    pub cat3: String,
    pub issue_message: String,
}

impl Entry {
    /// Entry that is moved into `cat1/cat2[/cat3]`.
    pub fn categorized(name: &str, cat1: &str, cat2: &str, cat3: &str) -> Self {
        Self {
            name: name.to_string(),
            cat1: cat1.to_string(),
            cat2: cat2.to_string(),
            cat3: cat3.to_string(),
            ..Default::default()
        }
    }

    /// Entry that is reported as an issue instead of being moved.
    pub fn flagged(name: &str, flag: &str, issue_message: &str) -> Self {
        Self {
            name: name.to_string(),
            flag: flag.to_string(),
            issue_message: issue_message.to_string(),
            ..Default::default()
        }
    }

    pub fn issue_kind(&self) -> Option<IssueKind> {
        IssueKind::from_flag(&self.flag)
    }

    pub fn is_flagged(&self) -> bool {
        self.issue_kind().is_some()
    }

    /// Whether the entry carries enough data to be processed at all.
    pub fn is_eligible(&self, require_cat2: bool) -> bool {
        if self.is_flagged() {
            return true;
        }
        let has_cat1 = !self.cat1.trim().is_empty();
        let has_cat2 = !self.cat2.trim().is_empty();
        has_cat1 && (!require_cat2 || has_cat2)
    }

    /// `reorg_root/cat1/cat2[/cat3]/name`; empty categories never produce a segment.
    pub fn destination(&self, reorg_root: &Path) -> PathBuf {
        let mut dest = reorg_root.to_path_buf();
        for cat in [&self.cat1, &self.cat2, &self.cat3] {
            let cat = cat.trim();
            if !cat.is_empty() {
                dest.push(cat);
            }
        }
        dest.push(&self.name);
        dest
    }

    /// Reject names and categories that could escape the working directory or
    /// the reorg root.
    pub fn check_path_segments(&self) -> Result<(), ReorgError> {
        let mut name_parts = Path::new(&self.name).components();
        match (name_parts.next(), name_parts.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ReorgError::unsafe_move(
                    &self.name,
                    "entry name must be a single path segment",
                ));
            }
        }

        for cat in [&self.cat1, &self.cat2, &self.cat3] {
            let escapes = Path::new(cat.trim())
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(ReorgError::unsafe_move(
                    &self.name,
                    format!("category '{cat}' must be a relative path without '..'"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_table() {
        assert_eq!(IssueKind::from_flag("d"), Some(IssueKind::Duplicate));
        assert_eq!(IssueKind::from_flag("u"), Some(IssueKind::Unclear));
        assert_eq!(IssueKind::from_flag("m"), Some(IssueKind::Misplaced));
        assert_eq!(IssueKind::from_flag("n"), Some(IssueKind::Unnecessary));
        assert_eq!(IssueKind::from_flag("x"), Some(IssueKind::Issue));
        assert_eq!(IssueKind::from_flag("?"), Some(IssueKind::Issue));
        assert_eq!(IssueKind::from_flag(""), None);
        assert_eq!(IssueKind::Unclear.to_string(), "Unclear");
    }

    #[test]
    fn whitespace_flag_is_still_an_issue() {
        assert_eq!(IssueKind::from_flag(" "), Some(IssueKind::Issue));
        assert_eq!(IssueKind::from_flag(" d "), Some(IssueKind::Duplicate));
        assert!(Entry::flagged("a.txt", "\t", "").is_flagged());
    }

    #[test]
    fn destination_with_and_without_cat3() {
        let root = Path::new("/archive");
        let two = Entry::categorized("report.txt", "Finance", "2023", "");
        assert_eq!(
            two.destination(root),
            PathBuf::from("/archive/Finance/2023/report.txt")
        );
        let three = Entry::categorized("report.txt", "Finance", "2023", "Q4");
        assert_eq!(
            three.destination(root),
            PathBuf::from("/archive/Finance/2023/Q4/report.txt")
        );
        let one = Entry::categorized("notes", "Misc", "", "");
        assert_eq!(one.destination(root), PathBuf::from("/archive/Misc/notes"));
    }

    #[test]
    fn eligibility() {
        assert!(Entry::flagged("a", "d", "").is_eligible(true));
        assert!(!Entry::default().is_eligible(false));
        let cat1_only = Entry::categorized("a", "Finance", "", "");
        assert!(cat1_only.is_eligible(false));
        assert!(!cat1_only.is_eligible(true));
        assert!(Entry::categorized("a", "Finance", "2023", "").is_eligible(true));
        assert!(!Entry::categorized("a", "", "2023", "").is_eligible(false));
    }

    #[test]
    fn segment_checks() {
        assert!(Entry::categorized("a.txt", "x", "y", "").check_path_segments().is_ok());
        assert!(Entry::categorized("../a.txt", "x", "y", "").check_path_segments().is_err());
        assert!(Entry::categorized("sub/a.txt", "x", "y", "").check_path_segments().is_err());
        assert!(Entry::categorized("a.txt", "..", "y", "").check_path_segments().is_err());
        assert!(Entry::categorized("a.txt", "x", "/etc", "").check_path_segments().is_err());
        assert!(Entry::categorized("", "x", "y", "").check_path_segments().is_err());
    }
}
