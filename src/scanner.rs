//! Directory scanning.
//!
//! For every path template the literal directory prefix is listed once and
//! every listed file is tried against each `remainder/file_template`
//! combination. Files that do not parse are simply not part of that file
//! template; a failing listing yields an empty result for its path template
//! and never aborts the other templates.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::fs::Filesystem;
use crate::index::{DateIndex, Index};
use crate::logging::{log_operation_end, log_scan_stats};
use crate::template::{join_template, CompiledTemplate};
use crate::temporal;

static PREFIX_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}/[0-9]{2}/[0-9]{2}").expect("prefix date pattern"));

/// Result of scanning one experiment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub index: Index,
    /// True if at least one path template produced dates for all its file templates
    pub found: bool,
}

/// Split a path template at its first directive into (prefix, remainder)
pub fn split_path_template(path_template: &str) -> (&str, &str) {
    match path_template.find(|c| c == '%' || c == '*') {
        Some(position) => path_template.split_at(position),
        None => (path_template, ""),
    }
}

/// A `YYYY/MM/DD` date embedded in a literal prefix
pub fn prefix_date(prefix: &str) -> Option<NaiveDate> {
    let found = PREFIX_DATE.find(prefix)?;
    NaiveDate::parse_from_str(found.as_str(), "%Y/%m/%d").ok()
}

/// Scan all path templates for all file templates.
///
/// A path template contributes to `found` only when every file template below
/// it yields at least one date; `found` is true if any path template does.
pub fn scan<F>(path_templates: &[String], file_templates: &[String], fs: &F) -> ScanOutcome
where
    F: Filesystem + ?Sized,
{
    let mut index = Index::new();
    let mut found = false;

    for path_template in path_templates {
        let start = Instant::now();
        let (prefix, remainder) = split_path_template(path_template);
        let default_date = prefix_date(prefix);
        let root = if prefix.is_empty() { "." } else { prefix };

        let listing = match fs.list(root, true) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(
                    path_template = path_template.as_str(),
                    root = root,
                    error = %e,
                    "Listing failed, continuing with no files"
                );
                Vec::new()
            }
        };

        let mut complete = !file_templates.is_empty();
        for file_template in file_templates {
            let template = join_template(remainder, file_template);
            let dates = index_listing(&template, &listing, default_date);
            complete &= !dates.is_empty();
            index.insert(path_template, file_template, dates);
        }

        if let Some(entry) = index.get(path_template) {
            log_scan_stats(path_template, listing.len(), &entry.files);
        }
        log_operation_end("scan_path_template", start, complete);
        found |= complete;
    }

    debug!(files = index.file_count(), found = found, "Scan complete");
    ScanOutcome { index, found }
}

/// Group every listed path that parses with `template` by date string.
///
/// When `default_date` is given it replaces the parsed year, month and day.
pub fn index_listing(template: &str, listing: &[String], default_date: Option<NaiveDate>) -> DateIndex {
    let mut dates = DateIndex::new();

    let compiled = match CompiledTemplate::compile(template) {
        Ok(compiled) => compiled,
        Err(e) => {
            warn!(template = template, error = %e, "Skipping template");
            return dates;
        }
    };

    for candidate in listing {
        let value = match temporal::parse(&compiled, candidate) {
            Ok(value) => value,
            Err(e) if e.is_mismatch() => {
                trace!(candidate = candidate.as_str(), error = %e, "No match");
                continue;
            }
            Err(e) => {
                debug!(candidate = candidate.as_str(), error = %e, "Could not parse");
                continue;
            }
        };

        let value = match default_date {
            Some(date) => value.replace_date(date),
            None => value,
        };
        dates
            .entry(value.dtg())
            .or_default()
            .insert(value.leadtime_seconds());
    }

    dates
}
