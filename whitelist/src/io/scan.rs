//! Location discovery on a local directory tree.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::command::Location;

/// List `(folder, file)` pairs: each top-level directory of `root` and its
/// immediate file entries. Hidden entries (`.git`, dotfiles) and names that
/// are not valid locations are skipped.
pub fn scan_locations(root: &Path) -> Result<Vec<Location>> {
    let mut locations = Vec::new();
    if !root.exists() {
        return Ok(locations);
    }

    let entries = fs::read_dir(root).with_context(|| format!("read {}", root.display()))?;
    for entry in entries.flatten() {
        let folder_path = entry.path();
        if !folder_path.is_dir() {
            continue;
        }
        let Some(folder) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if folder.starts_with('.') {
            continue;
        }

        let files = fs::read_dir(&folder_path)
            .with_context(|| format!("read {}", folder_path.display()))?;
        for file_entry in files.flatten() {
            if !file_entry.path().is_file() {
                continue;
            }
            let Some(file) = file_entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Ok(location) = Location::new(folder.clone(), file) {
                locations.push(location);
            }
        }
    }

    locations.sort();
    debug!(count = locations.len(), root = %root.display(), "scanned locations");
    Ok(locations)
}
