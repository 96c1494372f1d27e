//! Experiments: one run configuration of a case as seen from one host.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::fs::Filesystem;
use crate::index::MergedIndex;
use crate::logging::log_operation_start;
use crate::reconstruct::{self, ReconstructQuery};
use crate::scanner::{self, ScanOutcome};

/// A path template given either as one string or as a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PathTemplates {
    One(String),
    Many(Vec<String>),
}

impl From<PathTemplates> for Vec<String> {
    fn from(templates: PathTemplates) -> Self {
        match templates {
            PathTemplates::One(template) => vec![template],
            PathTemplates::Many(templates) => templates,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HostSettings {
    path_template: PathTemplates,
}

/// One experiment entry of a case's `meta.yaml`.
///
/// Every key other than `file_templates` and `domain` names a host and holds
/// that host's `path_template`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentMeta {
    pub file_templates: Vec<String>,

    /// Free-form domain description, carried through to summaries
    #[serde(default)]
    pub domain: serde_yaml::Value,

    #[serde(flatten)]
    pub hosts: BTreeMap<String, serde_yaml::Value>,
}

impl ExperimentMeta {
    pub fn defines_host(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }

    /// Path templates configured for a host, `None` if the host is not listed
    pub fn path_templates(&self, host: &str) -> Result<Option<Vec<String>>> {
        let Some(settings) = self.hosts.get(host) else {
            return Ok(None);
        };
        let settings: HostSettings = serde_yaml::from_value(settings.clone())?;
        Ok(Some(settings.path_template.into()))
    }
}

/// An experiment with its configuration for one host and its current index
#[derive(Debug, Clone)]
pub struct Experiment {
    case: String,
    name: String,
    host: String,
    file_templates: Vec<String>,
    path_templates: Vec<String>,
    domain: serde_yaml::Value,
    index: MergedIndex,
}

impl Experiment {
    /// Build an experiment from its metadata; `None` if it has nothing for `host`
    pub fn from_meta(case: &str, name: &str, host: &str, meta: &ExperimentMeta) -> Result<Option<Self>> {
        let Some(path_templates) = meta.path_templates(host)? else {
            return Ok(None);
        };
        if path_templates.is_empty() {
            return Err(CatalogError::Config {
                message: format!("{}/{}: empty path_template for host {}", case, name, host),
            });
        }

        Ok(Some(Self {
            case: case.to_string(),
            name: name.to_string(),
            host: host.to_string(),
            file_templates: meta.file_templates.clone(),
            path_templates,
            domain: meta.domain.clone(),
            index: MergedIndex::new(),
        }))
    }

    pub fn with_index(mut self, index: MergedIndex) -> Self {
        self.index = index;
        self
    }

    pub fn case(&self) -> &str {
        &self.case
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn file_templates(&self) -> &[String] {
        &self.file_templates
    }

    pub fn path_templates(&self) -> &[String] {
        &self.path_templates
    }

    pub fn domain(&self) -> &serde_yaml::Value {
        &self.domain
    }

    pub fn index(&self) -> &MergedIndex {
        &self.index
    }

    pub fn set_index(&mut self, index: MergedIndex) {
        self.index = index;
    }

    /// Scan every path template of this experiment for its file templates
    pub fn scan<F>(&self, fs: &F) -> ScanOutcome
    where
        F: Filesystem + ?Sized,
    {
        log_operation_start("scan_experiment", Some(&format!("{}/{}", self.case, self.name)));
        debug!(
            experiment = self.name.as_str(),
            file_templates = ?self.file_templates,
            path_templates = ?self.path_templates,
            "Searching for files"
        );
        scanner::scan(&self.path_templates, &self.file_templates, fs)
    }

    /// Paths of the indexed files selected by `query`
    pub fn reconstruct(&self, query: &ReconstructQuery) -> Result<Vec<String>> {
        reconstruct::reconstruct(&self.index, &self.path_templates, &self.file_templates, query)
    }

    /// Human readable description of the experiment and its index
    pub fn summary(&self, level: i32) -> Result<String> {
        super::summary::experiment_summary(self, level)
    }
}
