//! CSV entry table: `name,flag,cat1,cat2,cat3,issue_message`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::entry::Entry;

/// Read every row of `path` as an [`Entry`]. Missing columns are empty.
pub fn read_entries(path: &Path) -> Result<Vec<Entry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open table '{}'", path.display()))?;
    let mut entries = Vec::new();
    for (i, row) in reader.deserialize::<Entry>().enumerate() {
        // Row 1 is the header.
        let entry = row.with_context(|| format!("table '{}' row {}", path.display(), i + 2))?;
        if !entry.name.is_empty() {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Replace the table at `path` with `entries` (header always written).
pub fn write_entries(path: &Path, entries: &[Entry]) -> Result<()> {
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)
            .with_context(|| format!("create '{}'", tmp.display()))?;
        if entries.is_empty() {
            writer.write_record(["name", "flag", "cat1", "cat2", "cat3", "issue_message"])?;
        }
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("replace table '{}'", path.display()))?;
    Ok(())
}

/// Names in `dir`: directories first, then everything else, each group sorted.
pub fn list_names(dir: &Path) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for item in fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))? {
        let item = item?;
        let name = item.file_name().to_string_lossy().into_owned();
        if item.file_type()?.is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();
    dirs.extend(files);
    Ok(dirs)
}

/// Blank entries (name only) for every item in `dir`.
pub fn blank_entries(dir: &Path) -> Result<Vec<Entry>> {
    Ok(list_names(dir)?
        .into_iter()
        .map(|name| Entry {
            name,
            ..Default::default()
        })
        .collect())
}
