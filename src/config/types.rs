//! Core configuration types.
//! - Settings holds everything a batch run needs, tracker credentials included.
//! - LogLevel represents console verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::notifier::trello::TRELLO_API_BASE;

use super::paths;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Status lines (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace, including per-entry state transitions
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Issue-tracker credentials, names and (once resolved) ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub api_base: String,
    pub api_key: String,
    pub token: String,
    pub board_name: String,
    pub list_name: String,
    pub board_id: Option<String>,
    pub list_id: Option<String>,
    /// Member user names to assign to every ticket.
    pub member_names: Vec<String>,
    /// Ids for `member_names`, in the same order.
    pub member_ids: Option<Vec<String>>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            api_base: TRELLO_API_BASE.to_string(),
            api_key: String::new(),
            token: String::new(),
            board_name: String::new(),
            list_name: String::new(),
            board_id: None,
            list_id: None,
            member_names: Vec::new(),
            member_ids: None,
        }
    }
}

impl TrackerSettings {
    /// True when some id still has to be looked up on the tracker.
    pub fn needs_resolution(&self) -> bool {
        self.board_id.is_none()
            || self.list_id.is_none()
            || (self.member_ids.is_none() && !self.member_names.is_empty())
    }
}

/// Runtime configuration used by the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the categorized archive
    pub reorg_directory: PathBuf,
    /// Append-only log of completed moves
    pub change_log: PathBuf,
    /// Append-only log of flagged entries
    pub error_log: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a diagnostics log file
    pub log_file: Option<PathBuf>,
    /// Require both cat1 and cat2 before moving
    pub require_cat2: bool,
    pub tracker: TrackerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let data = paths::default_data_dir();
        Self {
            reorg_directory: PathBuf::new(),
            change_log: data.join("change.log"),
            error_log: data.join("error.log"),
            log_level: LogLevel::Normal,
            log_file: None,
            require_cat2: false,
            tracker: TrackerSettings::default(),
        }
    }
}
