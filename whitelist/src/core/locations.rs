//! Known whitelist locations and suggestion filtering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::command::Location;

/// Chat platforms cap suggestion lists; 25 is the common ceiling.
pub const MAX_SUGGESTIONS: usize = 25;

/// Immutable list of known locations, sorted and deduplicated.
///
/// Snapshots are never edited after construction; a refresh builds a new one
/// and swaps it in whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    locations: Vec<Location>,
}

impl LocationSnapshot {
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        let unique: BTreeSet<Location> = locations.into_iter().collect();
        Self {
            locations: unique.into_iter().collect(),
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.locations.binary_search(location).is_ok()
    }

    /// Distinct folder names matching `query`.
    pub fn folder_suggestions(&self, query: &str) -> Vec<String> {
        let mut folders: Vec<&str> = self
            .locations
            .iter()
            .map(|location| location.folder.as_str())
            .collect();
        folders.dedup();
        filter_choices(folders, query)
    }

    /// File names under `folder` matching `query`. With no folder, files from
    /// every folder are offered.
    pub fn file_suggestions(&self, folder: Option<&str>, query: &str) -> Vec<String> {
        let mut files: Vec<&str> = self
            .locations
            .iter()
            .filter(|location| folder.is_none_or(|folder| location.folder == folder))
            .map(|location| location.file.as_str())
            .collect();
        files.sort_unstable();
        files.dedup();
        filter_choices(files, query)
    }
}

/// Case-insensitive prefix filter, capped at [`MAX_SUGGESTIONS`].
fn filter_choices<'a>(choices: impl IntoIterator<Item = &'a str>, query: &str) -> Vec<String> {
    let query = query.trim().to_lowercase();
    choices
        .into_iter()
        .filter(|choice| choice.to_lowercase().starts_with(&query))
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}
