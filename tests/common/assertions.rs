//! Assertion utilities for testing.

use nwpcat::index::MergedIndex;
use std::path::Path;

/// Assert that every path exists on disk
pub fn assert_paths_exist(paths: &[String]) {
    for path in paths {
        assert!(Path::new(path).exists(), "Reconstructed path does not exist: {}", path);
    }
}

/// Assert the lead times stored for one file template and date
pub fn assert_leadtimes(index: &MergedIndex, file_template: &str, dtg: &str, expected: &[u64]) {
    let actual: Vec<u64> = index
        .leadtimes(file_template, dtg)
        .unwrap_or_else(|| panic!("No entry for {} at {}", file_template, dtg))
        .iter()
        .copied()
        .collect();
    assert_eq!(
        actual, expected,
        "Lead times differ for {} at {}",
        file_template, dtg
    );
}
