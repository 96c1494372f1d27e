//! Index structures describing which output exists.
//!
//! A scan produces an [`Index`] keyed by path template, then file template,
//! then date string, down to the set of lead times (seconds) found for that
//! date. [`merge`] folds the path-template level away into a [`MergedIndex`],
//! which is what gets persisted and queried.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sorted, de-duplicated lead times in seconds
pub type LeadTimes = BTreeSet<u64>;

/// Date string (`YYYY-MM-DD HH:MM:SS`) to lead times
pub type DateIndex = BTreeMap<String, LeadTimes>;

/// Everything indexed below one path template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTemplateIndex {
    pub path_template: String,
    pub files: BTreeMap<String, DateIndex>,
}

/// Scan result keyed by path template, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: Vec<PathTemplateIndex>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a path template, appending it if new
    pub fn entry_mut(&mut self, path_template: &str) -> &mut PathTemplateIndex {
        let position = match self
            .entries
            .iter()
            .position(|entry| entry.path_template == path_template)
        {
            Some(position) => position,
            None => {
                self.entries.push(PathTemplateIndex {
                    path_template: path_template.to_string(),
                    files: BTreeMap::new(),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[position]
    }

    /// Record the dates found for a file template under a path template
    pub fn insert(&mut self, path_template: &str, file_template: &str, dates: DateIndex) {
        self.entry_mut(path_template)
            .files
            .insert(file_template.to_string(), dates);
    }

    pub fn get(&self, path_template: &str) -> Option<&PathTemplateIndex> {
        self.entries
            .iter()
            .find(|entry| entry.path_template == path_template)
    }

    pub fn entries(&self) -> &[PathTemplateIndex] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (date, lead time) pairs across all entries
    pub fn file_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|entry| entry.files.values())
            .flat_map(|dates| dates.values())
            .map(|leadtimes| leadtimes.len())
            .sum()
    }
}

/// Index with the path template level removed: file template to dates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedIndex(BTreeMap<String, DateIndex>);

impl MergedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the dates of a file template.
    ///
    /// Dates already present are overwritten by the new lead time sets, other
    /// dates are kept.
    pub fn update(&mut self, file_template: &str, dates: DateIndex) {
        self.0
            .entry(file_template.to_string())
            .or_default()
            .extend(dates);
    }

    pub fn dates(&self, file_template: &str) -> Option<&DateIndex> {
        self.0.get(file_template)
    }

    pub fn leadtimes(&self, file_template: &str, dtg: &str) -> Option<&LeadTimes> {
        self.0.get(file_template)?.get(dtg)
    }

    pub fn contains(&self, file_template: &str) -> bool {
        self.0.contains_key(file_template)
    }

    pub fn file_templates(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DateIndex)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Newest date indexed for a file template
    pub fn latest_date(&self, file_template: &str) -> Option<&str> {
        self.dates(file_template)?
            .keys()
            .next_back()
            .map(String::as_str)
    }
}

impl FromIterator<(String, DateIndex)> for MergedIndex {
    fn from_iter<T: IntoIterator<Item = (String, DateIndex)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Drop the path template level of an index.
///
/// Path templates are applied in processing order and a later path template
/// replaces the lead time set of an earlier one for the same file template and
/// date. Lead times are never unioned across path templates.
pub fn merge(index: &Index) -> MergedIndex {
    let mut merged = MergedIndex::new();
    for entry in index.entries() {
        for (file_template, dates) in &entry.files {
            merged.update(file_template, dates.clone());
        }
    }
    merged
}
