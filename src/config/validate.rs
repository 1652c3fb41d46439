//! Config validation and one-time tracker id resolution.

use std::path::Path;
use tracing::{info, warn};

use crate::errors::ReorgError;
use crate::notifier::IssueNotifier;

use super::types::Settings;
use super::xml::{load_settings, save_settings};

impl Settings {
    /// Check that credentials, names and the reorg directory are present.
    pub fn validate(&self) -> Result<(), ReorgError> {
        let t = &self.tracker;
        if t.api_key.is_empty() || t.token.is_empty() {
            return Err(ReorgError::config("tracker credential(s) missing (api_key, token)"));
        }
        if t.board_name.is_empty() || t.list_name.is_empty() {
            return Err(ReorgError::config("tracker name(s) missing (board_name, list_name)"));
        }
        if self.reorg_directory.as_os_str().is_empty() {
            return Err(ReorgError::config("reorg_directory is missing"));
        }
        if self.reorg_directory.exists() && !self.reorg_directory.is_dir() {
            return Err(ReorgError::config(format!(
                "reorg_directory is not a directory: {}",
                self.reorg_directory.display()
            )));
        }
        if let (Some(ids), false) = (&t.member_ids, t.member_names.is_empty()) {
            if ids.len() != t.member_names.len() {
                return Err(ReorgError::config(format!(
                    "member_ids has {} entries but member_names has {}",
                    ids.len(),
                    t.member_names.len()
                )));
            }
        }
        info!(
            "Settings validated: reorg='{}' change_log='{}' error_log='{}'",
            self.reorg_directory.display(),
            self.change_log.display(),
            self.error_log.display()
        );
        Ok(())
    }

    /// Look up missing board/list/member ids. Returns true when anything changed.
    pub fn resolve_tracker_ids<N: IssueNotifier + ?Sized>(
        &mut self,
        notifier: &N,
    ) -> Result<bool, ReorgError> {
        if !self.tracker.needs_resolution() {
            return Ok(false);
        }
        warn!("Tracker id(s) missing. Attempting to find them...");
        let t = &mut self.tracker;

        let board_id = notifier
            .find_board_id(&t.board_name)
            .map_err(|e| ReorgError::config(format!("board lookup failed: {e}")))?;
        let list_id = notifier
            .find_list_id(&board_id, &t.list_name)
            .map_err(|e| ReorgError::config(format!("list lookup failed: {e}")))?;
        let member_ids = notifier
            .find_member_ids(&t.member_names)
            .map_err(|e| ReorgError::config(format!("member lookup failed: {e}")))?;

        info!("All tracker ids found");
        t.board_id = Some(board_id);
        t.list_id = Some(list_id);
        t.member_ids = Some(member_ids);
        Ok(true)
    }

    /// Resolve missing ids and persist them to `config_path` so later runs skip the lookup.
    ///
    /// Only the id fields are written back. The rest of the file is reloaded from disk,
    /// so values overridden on the command line for this run never reach the config.
    pub fn resolve_and_persist<N: IssueNotifier + ?Sized>(
        &mut self,
        notifier: &N,
        config_path: &Path,
    ) -> Result<bool, ReorgError> {
        let changed = self.resolve_tracker_ids(notifier)?;
        if changed {
            let mut on_disk = load_settings(config_path)
                .map_err(|e| ReorgError::config(format!("{e:#}")))?;
            on_disk.tracker.board_id = self.tracker.board_id.clone();
            on_disk.tracker.list_id = self.tracker.list_id.clone();
            on_disk.tracker.member_ids = self.tracker.member_ids.clone();
            save_settings(config_path, &on_disk)
                .map_err(|e| ReorgError::config(format!("{e:#}")))?;
        }
        Ok(changed)
    }
}
