//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Creates a commented template when the default file is missing.
//! - Writes settings back after tracker ids have been resolved.
//!
//! Notes:
//! - This module only reads/writes the config file; semantic checks live in validate.rs.
//! - Unknown XML fields are a hard error to surface misconfigurations early.

use anyhow::{anyhow, bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_data_dir, path_has_symlink_ancestor};
use super::types::{LogLevel, Settings, TrackerSettings};

/// Struct mirroring the XML config for (de)serialization.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename = "config", deny_unknown_fields)]
struct XmlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reorg_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    change_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    require_cat2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracker: Option<XmlTracker>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct XmlTracker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    board_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    board_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_id: Option<String>,
    /// Comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    member_names: Option<String>,
    /// Comma separated, same order as member_names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    member_ids: Option<String>,
}

/// Trimmed value, `None` when absent or blank.
fn text(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn split_list(v: &Option<String>) -> Vec<String> {
    text(v)
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_bool(v: &Option<String>, field: &str) -> Result<Option<bool>> {
    match text(v) {
        None => Ok(None),
        Some(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            _ => bail!("{field} must be true or false, got '{s}'"),
        },
    }
}

// Map XmlConfig -> Settings; absent fields keep their defaults.
fn xml_to_settings(parsed: XmlConfig) -> Result<Settings> {
    let mut s = Settings::default();

    if let Some(dir) = text(&parsed.reorg_directory) {
        s.reorg_directory = PathBuf::from(dir);
    }
    if let Some(p) = text(&parsed.change_log) {
        s.change_log = PathBuf::from(p);
    }
    if let Some(p) = text(&parsed.error_log) {
        s.error_log = PathBuf::from(p);
    }
    if let Some(level) = text(&parsed.log_level) {
        s.log_level = level.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    s.log_file = text(&parsed.log_file).map(PathBuf::from);
    if let Some(b) = parse_bool(&parsed.require_cat2, "require_cat2")? {
        s.require_cat2 = b;
    }

    if let Some(t) = parsed.tracker {
        let mut tracker = TrackerSettings::default();
        if let Some(base) = text(&t.api_base) {
            tracker.api_base = base;
        }
        tracker.api_key = text(&t.api_key).unwrap_or_default();
        tracker.token = text(&t.token).unwrap_or_default();
        tracker.board_name = text(&t.board_name).unwrap_or_default();
        tracker.list_name = text(&t.list_name).unwrap_or_default();
        tracker.board_id = text(&t.board_id);
        tracker.list_id = text(&t.list_id);
        tracker.member_names = split_list(&t.member_names);
        tracker.member_ids = text(&t.member_ids).map(|_| split_list(&t.member_ids));
        s.tracker = tracker;
    }
    Ok(s)
}

fn settings_to_xml(s: &Settings) -> XmlConfig {
    let t = &s.tracker;
    XmlConfig {
        reorg_directory: Some(s.reorg_directory.display().to_string()),
        change_log: Some(s.change_log.display().to_string()),
        error_log: Some(s.error_log.display().to_string()),
        log_level: Some(s.log_level.to_string()),
        log_file: s.log_file.as_ref().map(|p| p.display().to_string()),
        require_cat2: Some(s.require_cat2.to_string()),
        tracker: Some(XmlTracker {
            api_base: Some(t.api_base.clone()),
            api_key: Some(t.api_key.clone()),
            token: Some(t.token.clone()),
            board_name: Some(t.board_name.clone()),
            list_name: Some(t.list_name.clone()),
            board_id: t.board_id.clone(),
            list_id: t.list_id.clone(),
            member_names: Some(t.member_names.join(", ")),
            member_ids: t.member_ids.as_ref().map(|ids| ids.join(", ")),
        }),
    }
}

/// Parse settings from XML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let parsed: XmlConfig = from_xml_str(contents).context("parse config xml")?;
    xml_to_settings(parsed)
}

/// Load settings from a specific XML file path.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let settings =
        parse_settings(&contents).with_context(|| format!("load config '{}'", path.display()))?;
    debug!(config = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Render settings as XML (used when writing resolved ids back).
pub fn render_settings(settings: &Settings) -> Result<String> {
    let mut buffer = String::new();
    let mut ser = Serializer::new(&mut buffer);
    ser.indent(' ', 2);
    settings_to_xml(settings)
        .serialize(ser)
        .context("serialize config xml")?;
    buffer.push('\n');
    Ok(buffer)
}

/// Overwrite `path` with `settings` (temp sibling + rename).
///
/// Rendering drops XML comments, so an existing file is first copied to
/// [`backup_path`] as written by hand.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let rendered = render_settings(settings)?;
    if path.exists() {
        let bak = backup_path(path);
        fs::copy(path, &bak).with_context(|| format!("back up config to '{}'", bak.display()))?;
        info!("Previous config (with comments) kept at {}", bak.display());
    }
    let tmp = path.with_extension("xml.tmp");
    fs::write(&tmp, rendered).with_context(|| format!("write '{}'", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("replace config '{}'", path.display()));
    }
    info!("Saved resolved tracker ids to {}", path.display());
    Ok(())
}

/// Where [`save_settings`] keeps the file it replaces: `config.xml` -> `config.xml.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Create a commented template config file and its parent directory.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if path.exists() {
        bail!("Refusing to overwrite existing config {}", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
    }

    let data = default_data_dir();
    let content = format!(
        "<!--\n  reorg_move configuration (XML)\n\n  reorg_directory  -> root of the categorized archive (required)\n  change_log       -> append-only log of completed moves\n  error_log        -> append-only log of flagged entries\n  log_level        -> quiet | normal | info | debug\n  log_file         -> optional diagnostics log file\n  require_cat2     -> true to move only entries with both cat1 and cat2\n\n  tracker:\n    api_key, token           -> Trello credentials (required)\n    board_name, list_name    -> where tickets are created (required)\n    member_names             -> comma separated user names assigned to tickets\n    board_id, list_id, member_ids are filled in automatically on first run;\n    the file is then rewritten without comments and this version is kept as <name>.bak.\n\n  CLI flags override XML values.\n-->\n<config>\n  <reorg_directory></reorg_directory>\n  <change_log>{}</change_log>\n  <error_log>{}</error_log>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <require_cat2>false</require_cat2>\n  <tracker>\n    <api_key></api_key>\n    <token></token>\n    <board_name></board_name>\n    <list_name></list_name>\n    <member_names></member_names>\n  </tracker>\n</config>\n",
        data.join("change.log").display(),
        data.join("error.log").display(),
    );

    fs::write(path, content).with_context(|| format!("write template '{}'", path.display()))?;
    info!("Created template config at {}", path.display());
    Ok(())
}
