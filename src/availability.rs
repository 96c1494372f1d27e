//! Spot check that indexed files are still where the index says.

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::fs::Filesystem;
use crate::template::{join_template, CompiledTemplate, Directive};
use crate::temporal;

/// An indexed file that could not be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFile {
    pub case: String,
    pub experiment: String,
    pub file_template: String,
    pub path: String,
}

/// Probe one file per indexed file template of every experiment.
///
/// The probed file is the one of the newest indexed date with its shortest
/// lead time, rendered with the experiment's first path template. Templates
/// with wildcards are skipped.
pub fn check_availability<F>(catalog: &Catalog, fs: &F) -> Result<Vec<MissingFile>>
where
    F: Filesystem + ?Sized,
{
    let mut missing = Vec::new();

    for experiment in catalog.experiments() {
        let Some(root) = experiment.path_templates().first() else {
            continue;
        };

        let index = experiment.index();
        for file_template in index.file_templates() {
            let Some(dtg) = index.latest_date(file_template) else {
                continue;
            };
            let leadtime = index
                .leadtimes(file_template, dtg)
                .and_then(|leadtimes| leadtimes.iter().next().copied())
                .unwrap_or(0);

            let template = CompiledTemplate::compile(&join_template(root, file_template))?;
            if template.contains(Directive::Wildcard) {
                debug!(template = template.as_str(), "Wildcard paths cannot be probed");
                continue;
            }
            let path = temporal::render_dtg(&template, dtg, leadtime)?;

            if fs.exists(&path) {
                debug!(experiment = experiment.name(), path = path.as_str(), "Found");
            } else {
                warn!(
                    case = experiment.case(),
                    experiment = experiment.name(),
                    path = path.as_str(),
                    "Indexed file is missing"
                );
                missing.push(MissingFile {
                    case: experiment.case().to_string(),
                    experiment: experiment.name().to_string(),
                    file_template: file_template.to_string(),
                    path,
                });
            }
        }
    }

    Ok(missing)
}
