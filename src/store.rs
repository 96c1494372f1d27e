//! Persistence of per-case index documents.
//!
//! Every case keeps one document, `<cases_path>/<case>/data.json`, holding
//! the merged index of each experiment for each host:
//!
//! ```json
//! {"atos": {"exp": {"ICMSHHARM+%LLLL": {"2024-03-01 00:00:00": [0, 3600]}}}}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::index::MergedIndex;

/// Document name inside a case directory
pub const DATA_FILE: &str = "data.json";

/// Experiment name to merged index
pub type HostData = BTreeMap<String, MergedIndex>;

/// Host name to experiments, the full content of one case document
pub type CaseData = BTreeMap<String, HostData>;

/// Where case documents are read from and written to
pub trait IndexStore {
    /// Load the document of a case.
    ///
    /// The returned document always has an entry for `host`; a case never
    /// scanned yields just that empty entry.
    fn load(&self, case: &str, host: &str) -> Result<CaseData>;

    /// Replace the document of a case
    fn save(&self, case: &str, data: &CaseData) -> Result<()>;
}

impl<S: IndexStore + ?Sized> IndexStore for &S {
    fn load(&self, case: &str, host: &str) -> Result<CaseData> {
        (**self).load(case, host)
    }

    fn save(&self, case: &str, data: &CaseData) -> Result<()> {
        (**self).save(case, data)
    }
}

/// Pretty-printed JSON documents next to each case's `meta.yaml`
#[derive(Debug, Clone)]
pub struct JsonIndexStore {
    root: PathBuf,
}

impl JsonIndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, case: &str) -> PathBuf {
        self.root.join(case).join(DATA_FILE)
    }
}

impl IndexStore for JsonIndexStore {
    fn load(&self, case: &str, host: &str) -> Result<CaseData> {
        let path = self.document_path(case);
        let mut data = if path.is_file() {
            let content = fs::read_to_string(&path)?;
            let data: CaseData = serde_json::from_str(&content)?;
            debug!(case = case, hosts = data.len(), "Loaded stored index");
            data
        } else {
            debug!(case = case, path = %path.display(), "No stored index");
            CaseData::new()
        };
        data.entry(host.to_string()).or_default();
        Ok(data)
    }

    fn save(&self, case: &str, data: &CaseData) -> Result<()> {
        let path = self.document_path(case);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content)?;
        info!(case = case, path = %path.display(), "Index written");
        Ok(())
    }
}
