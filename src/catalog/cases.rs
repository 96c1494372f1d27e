//! The catalog: every selected case below a cases directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::fs::Filesystem;
use crate::logging::{log_operation_end, log_operation_start};
use crate::reconstruct::ReconstructQuery;
use crate::store::IndexStore;

use super::case::{Case, CaseScan, META_FILE};
use super::experiment::Experiment;
use super::selection::Selection;

/// Names of the directories below `cases_path` holding a `meta.yaml`, sorted
pub fn available_cases(cases_path: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(cases_path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().join(META_FILE).is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[derive(Debug, Clone)]
pub struct Catalog {
    cases_path: PathBuf,
    host: String,
    cases: Vec<Case>,
}

impl Catalog {
    /// Open the selected cases for a host.
    ///
    /// Selected cases that do not exist are logged and skipped; if none is
    /// left the error names the cases that are available.
    pub fn open<S>(cases_path: impl AsRef<Path>, host: &str, selection: &Selection, store: &S) -> Result<Self>
    where
        S: IndexStore + ?Sized,
    {
        let cases_path = cases_path.as_ref();
        let available = available_cases(cases_path)?;
        debug!(cases_path = %cases_path.display(), available = ?available, "Available cases");

        let names: Vec<String> = if selection.is_empty() {
            available.clone()
        } else {
            let (found, missing): (Vec<&str>, Vec<&str>) = selection
                .case_names()
                .partition(|name| available.iter().any(|a| a.as_str() == *name));
            if !missing.is_empty() {
                warn!(missing = ?missing, "Could not find cases");
            }
            found.into_iter().map(str::to_string).collect()
        };

        if names.is_empty() {
            let requested: Vec<&str> = selection.case_names().collect();
            return Err(CatalogError::CaseNotFound {
                name: format!(
                    "{} (available: {})",
                    if requested.is_empty() { "any".to_string() } else { requested.join(":") },
                    available.join(", ")
                ),
            });
        }

        let cases = names
            .iter()
            .map(|name| Case::open(cases_path, name, host, selection.experiments(name), store))
            .collect::<Result<Vec<_>>>()?;
        info!(host = host, cases = ?names, "Loaded cases");

        Ok(Self {
            cases_path: cases_path.to_path_buf(),
            host: host.to_string(),
            cases,
        })
    }

    pub fn cases_path(&self) -> &Path {
        &self.cases_path
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn case(&self, name: &str) -> Option<&Case> {
        self.cases.iter().find(|case| case.name() == name)
    }

    /// Look up one experiment of one case
    pub fn experiment(&self, case: &str, name: &str) -> Result<&Experiment> {
        let found = self.case(case).ok_or_else(|| CatalogError::CaseNotFound {
            name: case.to_string(),
        })?;
        found
            .experiment(name)
            .ok_or_else(|| CatalogError::ExperimentNotFound {
                case: case.to_string(),
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(Case::name).collect()
    }

    /// Every experiment of every case, in case order
    pub fn experiments(&self) -> impl Iterator<Item = &Experiment> {
        self.cases.iter().flat_map(|case| case.experiments().iter())
    }

    /// Scan all cases and save their documents
    pub fn scan<F, S>(&mut self, fs: &F, store: &S) -> Result<Vec<(String, CaseScan)>>
    where
        F: Filesystem + ?Sized,
        S: IndexStore + ?Sized,
    {
        let start = Instant::now();
        log_operation_start("scan", Some(&self.names().join(":")));

        let mut results = Vec::new();
        let mut complete = true;
        for case in &mut self.cases {
            let scanned = case.scan(fs, store)?;
            complete &= scanned.not_found.is_empty();
            results.push((case.name().to_string(), scanned));
        }

        log_operation_end("scan", start, complete);
        Ok(results)
    }

    /// Reconstructed paths of all cases, in case order
    pub fn reconstruct(&self, query: &ReconstructQuery) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for case in &self.cases {
            paths.extend(case.reconstruct(query)?);
        }
        Ok(paths)
    }

    /// Summary of all cases; a negative level lists the case names only
    pub fn summary(&self, level: i32) -> Result<String> {
        if level < 0 {
            return Ok(format!("Cases: [{}]", self.names().join(", ")));
        }
        let mut parts = Vec::new();
        for case in &self.cases {
            parts.push(format!("\nCase: {}", case.name()));
            parts.push(case.summary(level)?);
        }
        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonIndexStore;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_case(root: &Path, name: &str, meta: &str) {
        fs::create_dir_all(root.join(name)).unwrap();
        fs::write(root.join(name).join(META_FILE), meta).unwrap();
    }

    const META: &str = "exp:\n  file_templates: [\"f+%LL\"]\n  atos:\n    path_template: /a/\n";

    #[test]
    fn test_available_cases() {
        let dir = tempdir().unwrap();
        write_case(dir.path(), "beta", META);
        write_case(dir.path(), "alpha", META);
        fs::create_dir_all(dir.path().join("no_meta")).unwrap();
        write_case(dir.path(), ".hidden", META);

        assert_eq!(available_cases(dir.path()).unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_open_all_and_selected() {
        let dir = tempdir().unwrap();
        write_case(dir.path(), "alpha", META);
        write_case(dir.path(), "beta", META);
        let store = JsonIndexStore::new(dir.path());

        let all = Catalog::open(dir.path(), "atos", &Selection::all(), &store).unwrap();
        assert_eq!(all.names(), vec!["alpha", "beta"]);
        assert_eq!(all.experiments().count(), 2);

        let selection = Selection::from_args(Some("beta:gamma"), None).unwrap();
        let some = Catalog::open(dir.path(), "atos", &selection, &store).unwrap();
        assert_eq!(some.names(), vec!["beta"]);

        assert!(some.experiment("beta", "exp").is_ok());
        assert!(matches!(
            some.experiment("beta", "other"),
            Err(CatalogError::ExperimentNotFound { .. })
        ));
        assert!(matches!(
            some.experiment("alpha", "exp"),
            Err(CatalogError::CaseNotFound { .. })
        ));
    }

    #[test]
    fn test_open_nothing_found() {
        let dir = tempdir().unwrap();
        write_case(dir.path(), "alpha", META);
        let store = JsonIndexStore::new(dir.path());

        let selection = Selection::from_args(Some("gamma"), None).unwrap();
        let err = Catalog::open(dir.path(), "atos", &selection, &store).unwrap_err();
        match err {
            CatalogError::CaseNotFound { name } => assert!(name.contains("alpha")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_summary_negative_level() {
        let dir = tempdir().unwrap();
        write_case(dir.path(), "alpha", META);
        let store = JsonIndexStore::new(dir.path());

        let catalog = Catalog::open(dir.path(), "atos", &Selection::all(), &store).unwrap();
        assert_eq!(catalog.summary(-1).unwrap(), "Cases: [alpha]");
        assert!(catalog.summary(0).unwrap().contains("Case: alpha"));
    }
}
