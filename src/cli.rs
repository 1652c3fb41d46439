//! CLI definition and parsing.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Flags that also exist in config.xml override the file values.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use reorg_move::{LogLevel, Settings};

/// Reorganize a working directory into a categorized archive.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Move categorized files into an archive, log every change, ticket flagged items"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Explicit config file (overrides REORG_MOVE_CONFIG and the default location).
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the reorg directory (normally configured via XML).
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub reorg_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the config file location used by reorg_move and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a blank entry table listing the working directory (directories first).
    Init {
        /// CSV table to create.
        #[arg(value_hint = ValueHint::FilePath)]
        table: PathBuf,

        /// Directory to list (defaults to the current directory).
        #[arg(long, short = 'w', value_hint = ValueHint::DirPath)]
        working_dir: Option<PathBuf>,

        /// Replace an existing table.
        #[arg(long)]
        force: bool,
    },
    /// Process a filled-in entry table and rewrite it with the entries left over.
    Process {
        /// CSV table to process.
        #[arg(value_hint = ValueHint::FilePath)]
        table: PathBuf,

        /// Directory the entry names refer to (defaults to the current directory).
        #[arg(long, short = 'w', value_hint = ValueHint::DirPath)]
        working_dir: Option<PathBuf>,

        /// Show what would be done without moving, logging or creating tickets.
        #[arg(long)]
        dry_run: bool,

        /// Only move entries that have both cat1 and cat2.
        #[arg(long)]
        require_cat2: bool,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to loaded Settings (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(dir) = &self.reorg_dir {
            settings.reorg_directory = dir.clone();
        }
        if let Some(level) = self.effective_log_level() {
            settings.log_level = level;
        }
        if let Some(Command::Process {
            require_cat2: true, ..
        }) = &self.command
        {
            settings.require_cat2 = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_log_level() {
        let args = Args::parse_from(["reorg_move", "--log-level", "quiet", "--debug"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn overrides_apply_to_settings() {
        let args = Args::parse_from([
            "reorg_move",
            "process",
            "table.csv",
            "--require-cat2",
            "--reorg-dir",
            "/srv/reorg",
        ]);
        let mut settings = Settings::default();
        args.apply_overrides(&mut settings);
        assert!(settings.require_cat2);
        assert_eq!(settings.reorg_directory, PathBuf::from("/srv/reorg"));
    }
}
