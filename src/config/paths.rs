//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/data paths and detects symlinked ancestors for safety.

use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "REORG_MOVE_CONFIG";

const APP_DIR: &str = "reorg_move";

/// Config path: `$REORG_MOVE_CONFIG` when set, else `<config_dir>/reorg_move/config.xml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        if !p.is_empty() {
            return Some(PathBuf::from(p));
        }
    }
    if let Some(mut base) = config_dir() {
        base.push(APP_DIR);
        base.push("config.xml");
        Some(base)
    } else {
        env::var("HOME").ok().map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join(APP_DIR)
                .join("config.xml")
        })
    }
}

/// Directory holding the change/error logs unless configured otherwise.
pub fn default_data_dir() -> PathBuf {
    match data_dir() {
        Some(base) => base.join(APP_DIR),
        None => env::var("HOME")
            .map(|h| PathBuf::from(h).join(".local").join("share").join(APP_DIR))
            .unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
