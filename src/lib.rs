//! Core library for `reorg_move`.
//!
//! Moves items from a working directory into a categorized archive, keeps
//! append-only change and error logs, and raises tickets for flagged items.
//! The binary in `main.rs` only wires configuration, logging and the CLI
//! around [`BatchProcessor`].

pub mod activity_log;
pub mod batch;
pub mod config;
pub mod entry;
pub mod errors;
pub mod fs_ops;
pub mod message;
pub mod notifier;
pub mod output;
pub mod paths;
pub mod shutdown;
pub mod table;

pub use activity_log::{timestamp_now, ActivityLog, TIMESTAMP_FORMAT};
pub use batch::{BatchProcessor, BatchReport, BatchSettings, EntryState, TicketTarget};
pub use config::{
    default_config_path, path_has_symlink_ancestor, LogLevel, Settings, TrackerSettings,
};
pub use entry::{Entry, IssueKind};
pub use errors::ReorgError;
pub use fs_ops::{attempt, relocate, MoveResult};
pub use message::{compose_issue_message, compose_move_message};
pub use notifier::{IssueNotifier, TrackerError, TrelloClient, TrelloConfig};
pub use paths::{display_name, shorten, shorten_from_common_ancestor, ShortenContext, ShortenError};
