//! Batch processing of entries: move-and-log for categorized entries,
//! log-and-ticket for flagged ones.
//!
//! Entries are handled strictly one after another. A failed move never stops
//! the batch: the entry is kept in `BatchReport::retained` so a later run can
//! pick it up again. A flagged entry counts as processed once its error-log
//! line is written, whether or not the ticket could be created.

use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, error, info, warn};

use crate::activity_log::{timestamp_now, ActivityLog};
use crate::entry::Entry;
use crate::errors::ReorgError;
use crate::fs_ops::{attempt, MoveResult};
use crate::message::{compose_issue_message, compose_move_message};
use crate::notifier::IssueNotifier;
use crate::paths::ShortenContext;
use crate::shutdown;

/// Where tickets go on the tracker.
#[derive(Debug, Clone, Default)]
pub struct TicketTarget {
    pub list_id: String,
    pub member_ids: Vec<String>,
}

/// Everything a batch needs besides the entries themselves.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Directory the entry names are relative to.
    pub working_dir: PathBuf,
    /// Root of the categorized archive.
    pub reorg_root: PathBuf,
    pub logs: ActivityLog,
    /// Also require `cat2` before a categorized entry is moved.
    pub require_cat2: bool,
    pub ticket: TicketTarget,
    /// Shortening applied to ticket titles; `None` keeps full paths (with a warning).
    pub ticket_paths: Option<ShortenContext>,
    /// Report what would happen without touching files, logs or the tracker.
    pub dry_run: bool,
}

impl BatchSettings {
    /// Defaults: `cat2` optional, ticket titles shortened to the nearest
    /// ancestor shared with the reorg root, no dry run.
    pub fn new(working_dir: impl Into<PathBuf>, reorg_root: impl Into<PathBuf>, logs: ActivityLog) -> Self {
        let reorg_root = reorg_root.into();
        Self {
            working_dir: working_dir.into(),
            ticket_paths: Some(ShortenContext::nearest_common(&reorg_root)),
            reorg_root,
            logs,
            require_cat2: false,
            ticket: TicketTarget::default(),
            dry_run: false,
        }
    }
}

/// Per-entry progress, traced at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Moving,
    Logging,
    Notifying,
    Done,
    SkippedAndRetained,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryState::Pending => "pending",
            EntryState::Moving => "moving",
            EntryState::Logging => "logging",
            EntryState::Notifying => "notifying",
            EntryState::Done => "done",
            EntryState::SkippedAndRetained => "skipped_and_retained",
        };
        f.write_str(s)
    }
}

/// Result of one `process` call.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Entries moved, with their final location.
    pub moved: Vec<(Entry, PathBuf)>,
    /// Flagged entries written to the error log.
    pub issues: Vec<Entry>,
    /// Tickets created on the tracker.
    pub tickets_created: usize,
    /// Ticket failures (entries still counted as processed).
    pub ticket_failures: Vec<ReorgError>,
    /// Entries left for a future run, in input order.
    pub retained: Vec<Entry>,
    /// Set when a shutdown request stopped the batch early.
    pub interrupted: bool,
}

impl BatchReport {
    /// True when nothing is left to process.
    pub fn is_cleared(&self) -> bool {
        self.retained.is_empty()
    }

    pub fn processed(&self) -> usize {
        self.moved.len() + self.issues.len()
    }
}

pub struct BatchProcessor<'a, N: IssueNotifier + ?Sized> {
    settings: &'a BatchSettings,
    notifier: &'a N,
}

impl<'a, N: IssueNotifier + ?Sized> BatchProcessor<'a, N> {
    pub fn new(settings: &'a BatchSettings, notifier: &'a N) -> Self {
        Self { settings, notifier }
    }

    /// Process `entries` in order and report what was done and what is left.
    pub fn process(&self, entries: &[Entry]) -> BatchReport {
        info!(count = entries.len(), "Processing table entries...");
        let mut report = BatchReport::default();

        for (i, entry) in entries.iter().enumerate() {
            if shutdown::is_requested() {
                warn!(remaining = entries.len() - i, "Shutdown requested; leaving remaining entries for the next run");
                report.interrupted = true;
                report.retained.extend_from_slice(&entries[i..]);
                break;
            }
            transition(entry, EntryState::Pending);

            let state = if !entry.is_eligible(self.settings.require_cat2) {
                debug!(entry = %entry.name, "No flag or categories; left untouched");
                EntryState::SkippedAndRetained
            } else if let Err(e) = entry.check_path_segments() {
                error!(code = e.code(), entry = %entry.name, error = %e, "Entry skipped");
                EntryState::SkippedAndRetained
            } else if entry.is_flagged() {
                self.process_issue(entry, &mut report)
            } else {
                self.process_move(entry, &mut report)
            };

            transition(entry, state);
            if state == EntryState::SkippedAndRetained {
                report.retained.push(entry.clone());
            }
        }

        info!(
            moved = report.moved.len(),
            issues = report.issues.len(),
            tickets = report.tickets_created,
            ticket_failures = report.ticket_failures.len(),
            retained = report.retained.len(),
            "Batch finished"
        );
        report
    }

    fn source_of(&self, entry: &Entry) -> PathBuf {
        self.settings.working_dir.join(&entry.name)
    }

    fn process_move(&self, entry: &Entry, report: &mut BatchReport) -> EntryState {
        let source = self.source_of(entry);
        let destination = entry.destination(&self.settings.reorg_root);
        transition(entry, EntryState::Moving);

        if self.settings.dry_run {
            info!(src = %source.display(), dest = %destination.display(), "dry-run: would move");
            return EntryState::SkippedAndRetained;
        }

        let moved_to = match attempt(&source, &destination) {
            Ok(MoveResult::Moved(dest)) => dest,
            Ok(MoveResult::SkippedSourceMissing) | Ok(MoveResult::SkippedDestinationExists) => {
                info!("Move has been skipped. Continuing...");
                return EntryState::SkippedAndRetained;
            }
            Err(e) => {
                error!(code = e.code(), entry = %entry.name, error = %e, "Move failed. Continuing...");
                return EntryState::SkippedAndRetained;
            }
        };

        transition(entry, EntryState::Logging);
        let message = compose_move_message(&source, &moved_to);
        if let Err(e) = self.settings.logs.record_move(&timestamp_now(), &message) {
            warn!(log = %self.settings.logs.change_log.display(), error = %e, "Could not write change log");
        }
        report.moved.push((entry.clone(), moved_to));
        EntryState::Done
    }

    fn process_issue(&self, entry: &Entry, report: &mut BatchReport) -> EntryState {
        let source = self.source_of(entry);
        info!("Issue found at {}", shown_source(&source));

        transition(entry, EntryState::Logging);
        let log_message = compose_issue_message(entry, &source, false, None);
        let title = compose_issue_message(entry, &source, true, self.settings.ticket_paths.as_ref());

        if self.settings.dry_run {
            info!(log = %log_message, ticket = %title, "dry-run: would log issue and create ticket");
            return EntryState::SkippedAndRetained;
        }

        if let Err(e) = self.settings.logs.record_issue(&timestamp_now(), &log_message) {
            // Without a durable log line the issue would vanish from the table; keep it.
            warn!(log = %self.settings.logs.error_log.display(), error = %e, "Could not write error log, entry retained");
            return EntryState::SkippedAndRetained;
        }

        transition(entry, EntryState::Notifying);
        let ticket = &self.settings.ticket;
        match self
            .notifier
            .create_ticket(&ticket.list_id, &title, &entry.issue_message, &ticket.member_ids)
        {
            Ok(id) => {
                debug!(ticket = %id, entry = %entry.name, "Ticket created");
                report.tickets_created += 1;
            }
            Err(e) => {
                let failure = ReorgError::NotificationFailed {
                    title,
                    reason: e.to_string(),
                };
                warn!(code = failure.code(), error = %failure, "Continuing without a ticket");
                report.ticket_failures.push(failure);
            }
        }

        report.issues.push(entry.clone());
        EntryState::Done
    }
}

fn transition(entry: &Entry, state: EntryState) {
    debug!(entry = %entry.name, %state, "entry state");
}

/// Directories get a trailing separator in status lines.
fn shown_source(source: &Path) -> String {
    if source.is_dir() {
        format!("{}{MAIN_SEPARATOR}", source.display())
    } else {
        source.display().to_string()
    }
}
