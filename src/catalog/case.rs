//! A case: the experiments described by one `meta.yaml` and their index.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{CatalogError, Result};
use crate::fs::Filesystem;
use crate::index::merge;
use crate::logging::log_timed_operation;
use crate::reconstruct::ReconstructQuery;
use crate::store::{CaseData, HostData, IndexStore};

use super::experiment::{Experiment, ExperimentMeta};

/// Metadata file that marks a directory as a case
pub const META_FILE: &str = "meta.yaml";

/// Experiments of a case with their metadata, in `meta.yaml` order
pub type CaseMeta = Vec<(String, ExperimentMeta)>;

/// Read `<cases_path>/<case>/meta.yaml`
pub fn read_meta(cases_path: &Path, case: &str) -> Result<CaseMeta> {
    let content = fs::read_to_string(cases_path.join(case).join(META_FILE))?;
    let mapping: Mapping = serde_yaml::from_str(&content)?;

    let mut meta = CaseMeta::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = match key {
            Value::String(name) => name,
            Value::Number(number) => number.to_string(),
            other => {
                return Err(CatalogError::Config {
                    message: format!("{}: experiment names must be strings, got {:?}", case, other),
                })
            }
        };
        meta.push((name, serde_yaml::from_value(value)?));
    }
    Ok(meta)
}

/// Outcome of scanning a case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseScan {
    /// Experiments whose index was replaced
    pub found: Vec<String>,
    /// Experiments for which nothing was found
    pub not_found: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Case {
    name: String,
    host: String,
    /// Experiment names of the (filtered) metadata, whatever the host
    names: Vec<String>,
    experiments: Vec<Experiment>,
    experiments_given: bool,
    data: CaseData,
}

impl Case {
    /// Open a case for a host.
    ///
    /// `selected` narrows the experiments; names not present in the metadata
    /// are logged and skipped. Only experiments configured for `host` are
    /// kept, each loaded with its stored index.
    pub fn open<S>(cases_path: &Path, name: &str, host: &str, selected: &[String], store: &S) -> Result<Self>
    where
        S: IndexStore + ?Sized,
    {
        let mut meta = read_meta(cases_path, name)?;

        if !selected.is_empty() {
            let missing: Vec<&str> = selected
                .iter()
                .filter(|exp| !meta.iter().any(|(name, _)| name == *exp))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                warn!(case = name, missing = ?missing, "Could not find experiments");
            }
            meta.retain(|(exp, _)| selected.contains(exp));
        }

        let data = store.load(name, host)?;
        let stored = data.get(host);

        let mut experiments = Vec::new();
        for (exp_name, exp_meta) in &meta {
            if let Some(experiment) = Experiment::from_meta(name, exp_name, host, exp_meta)? {
                let index = stored
                    .and_then(|host_data| host_data.get(exp_name))
                    .cloned()
                    .unwrap_or_default();
                experiments.push(experiment.with_index(index));
            }
        }

        Ok(Self {
            name: name.to_string(),
            host: host.to_string(),
            names: meta.iter().map(|(exp, _)| exp.clone()).collect(),
            experiments,
            experiments_given: !selected.is_empty(),
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// All experiment names in the case metadata
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Experiments configured for this host
    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|exp| exp.name() == name)
    }

    pub fn experiments_given(&self) -> bool {
        self.experiments_given
    }

    /// The full stored document, including other hosts
    pub fn data(&self) -> &CaseData {
        &self.data
    }

    /// Scan every experiment and save the case document.
    ///
    /// Without an explicit experiment selection the stored data of this host
    /// is rebuilt from scratch. Experiments with no data keep their previous
    /// index only when they were selected explicitly.
    pub fn scan<F, S>(&mut self, fs: &F, store: &S) -> Result<CaseScan>
    where
        F: Filesystem + ?Sized,
        S: IndexStore + ?Sized,
    {
        if !self.experiments_given {
            let previous = self.data.insert(self.host.clone(), HostData::new());
            if previous.is_some_and(|host_data| !host_data.is_empty()) {
                info!(case = self.name.as_str(), host = self.host.as_str(), "Rewriting index from scratch");
            }
        }

        let mut outcome = CaseScan::default();
        for experiment in &mut self.experiments {
            let scanned = log_timed_operation("scan_experiment", || experiment.scan(fs));
            if scanned.found {
                let merged = merge(&scanned.index);
                self.data
                    .entry(self.host.clone())
                    .or_default()
                    .insert(experiment.name().to_string(), merged.clone());
                experiment.set_index(merged);
                outcome.found.push(experiment.name().to_string());
            } else {
                warn!(
                    case = self.name.as_str(),
                    experiment = experiment.name(),
                    "No data found"
                );
                if !self.experiments_given {
                    experiment.set_index(Default::default());
                }
                outcome.not_found.push(experiment.name().to_string());
            }
        }

        store.save(&self.name, &self.data)?;
        Ok(outcome)
    }

    /// Reconstructed paths of all experiments, in experiment order
    pub fn reconstruct(&self, query: &ReconstructQuery) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for experiment in &self.experiments {
            paths.extend(experiment.reconstruct(query)?);
        }
        Ok(paths)
    }

    /// Summary of the case; level 0 and below lists the experiment names only
    pub fn summary(&self, level: i32) -> Result<String> {
        if level <= 0 {
            return Ok(format!(" Runs: [{}]", self.names.join(", ")));
        }
        let parts = self
            .experiments
            .iter()
            .map(|experiment| experiment.summary(level))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join("\n"))
    }
}
