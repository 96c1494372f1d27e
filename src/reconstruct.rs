//! Path reconstruction from a merged index.

use regex::Regex;
use std::time::Duration;
use tracing::warn;

use crate::error::Result;
use crate::index::{DateIndex, MergedIndex};
use crate::template::{join_template, CompiledTemplate};
use crate::temporal::{self, TemporalValue};

/// Which part of an index to turn back into paths.
///
/// Empty `dates` or `leadtimes` select everything stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructQuery {
    /// Date strings (`YYYY-MM-DD HH:MM:SS`)
    pub dates: Vec<String>,
    /// Lead times in seconds
    pub leadtimes: Vec<u64>,
    /// Restrict to one file template instead of all configured ones
    pub file_template: Option<String>,
}

impl ReconstructQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_date(dtg: impl Into<String>) -> Self {
        Self {
            dates: vec![dtg.into()],
            ..Self::default()
        }
    }

    pub fn with_leadtimes(mut self, leadtimes: Vec<u64>) -> Self {
        self.leadtimes = leadtimes;
        self
    }

    pub fn with_file_template(mut self, file_template: impl Into<String>) -> Self {
        self.file_template = Some(file_template.into());
        self
    }
}

/// Index keys matching the candidate file templates.
///
/// A key matches a candidate when it is equal to it or, failing that, when
/// the candidate read as a regular expression matches the whole key. Keys are
/// returned per candidate in index order, so a key can appear more than once.
pub fn match_file_templates<'a>(candidates: &[String], index: &'a MergedIndex) -> Vec<&'a str> {
    let mut matched = Vec::new();
    for candidate in candidates {
        let pattern = Regex::new(&format!("^(?:{})$", candidate)).ok();
        for key in index.file_templates() {
            let hit = key == candidate
                || pattern
                    .as_ref()
                    .map(|pattern| pattern.is_match(key))
                    .unwrap_or(false);
            if hit {
                matched.push(key);
            }
        }
    }
    matched
}

/// Regenerate the paths of indexed files.
///
/// `file_templates` are the templates configured for the experiment and are
/// used unless the query names one. For every matched file template, the
/// selected dates are visited in ascending order, then the selected lead
/// times in ascending order, and one path is rendered per template root.
/// Requested dates or lead times absent from the index produce nothing;
/// repeated requests produce repeated paths. A file template that cannot be
/// rendered is logged and skipped.
pub fn reconstruct(
    index: &MergedIndex,
    template_roots: &[String],
    file_templates: &[String],
    query: &ReconstructQuery,
) -> Result<Vec<String>> {
    let candidates = match &query.file_template {
        Some(file_template) => vec![file_template.clone()],
        None => file_templates.to_vec(),
    };

    let mut paths = Vec::new();
    for file_template in match_file_templates(&candidates, index) {
        let Some(known) = index.dates(file_template) else {
            continue;
        };
        match render_file_template(known, template_roots, file_template, query) {
            Ok(rendered) => paths.extend(rendered),
            Err(e) => warn!(
                file_template = file_template,
                error = %e,
                "Skipping file template that cannot be rendered"
            ),
        }
    }

    Ok(paths)
}

fn render_file_template(
    known: &DateIndex,
    template_roots: &[String],
    file_template: &str,
    query: &ReconstructQuery,
) -> Result<Vec<String>> {
    let compiled = template_roots
        .iter()
        .map(|root| CompiledTemplate::compile(&join_template(root, file_template)))
        .collect::<Result<Vec<_>>>()?;

    let dates: Vec<&str> = if query.dates.is_empty() {
        known.keys().map(String::as_str).collect()
    } else {
        let mut requested: Vec<&str> = query.dates.iter().map(String::as_str).collect();
        requested.sort_unstable();
        requested
    };

    let mut paths = Vec::new();
    for dtg in dates {
        let Some(stored) = known.get(dtg) else {
            continue;
        };
        let datetime = temporal::parse_dtg(dtg)?;

        let leadtimes: Vec<u64> = if query.leadtimes.is_empty() {
            stored.iter().copied().collect()
        } else {
            let mut requested: Vec<u64> = query
                .leadtimes
                .iter()
                .copied()
                .filter(|leadtime| stored.contains(leadtime))
                .collect();
            requested.sort_unstable();
            requested
        };

        for leadtime in leadtimes {
            let value = TemporalValue::with_leadtime(datetime, Duration::from_secs(leadtime));
            for template in &compiled {
                paths.push(temporal::format(template, &value)?);
            }
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index(items: &[(&str, &[(&str, &[u64])])]) -> MergedIndex {
        items
            .iter()
            .map(|(file, dates)| {
                let dates: DateIndex = dates
                    .iter()
                    .map(|(dtg, leadtimes)| (dtg.to_string(), leadtimes.iter().copied().collect()))
                    .collect();
                (file.to_string(), dates)
            })
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_leadtime_filtering() {
        let idx = index(&[(
            "ICMSHHARM+%LLLL",
            &[("2024-03-01 00:00:00", &[0, 1800, 3600])],
        )]);
        let roots = strings(&["/arch/%Y/%m/%d/%H"]);
        let files = strings(&["ICMSHHARM+%LLLL"]);

        let one = reconstruct(
            &idx,
            &roots,
            &files,
            &ReconstructQuery::all().with_leadtimes(vec![3600]),
        )
        .unwrap();
        assert_eq!(one, vec!["/arch/2024/03/01/00/ICMSHHARM+0001".to_string()]);

        let none = reconstruct(
            &idx,
            &roots,
            &files,
            &ReconstructQuery::all().with_leadtimes(vec![7200]),
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_ordering_dates_then_leadtimes() {
        let idx = index(&[(
            "fc+%LL",
            &[
                ("2024-03-02 00:00:00", &[3600, 0]),
                ("2024-03-01 12:00:00", &[7200]),
            ],
        )]);
        let paths = reconstruct(
            &idx,
            &strings(&["%Y%m%d%H"]),
            &strings(&["fc+%LL"]),
            &ReconstructQuery::all(),
        )
        .unwrap();
        assert_eq!(
            paths,
            strings(&["2024030112/fc+02", "2024030200/fc+00", "2024030200/fc+01"])
        );
    }

    #[test]
    fn test_requested_dates_absent_from_index() {
        let idx = index(&[("f+%LL", &[("2024-03-01 00:00:00", &[0])])]);
        let query = ReconstructQuery {
            dates: strings(&["2024-03-05 00:00:00", "2024-03-01 00:00:00"]),
            ..ReconstructQuery::default()
        };
        let paths = reconstruct(&idx, &strings(&["/a"]), &strings(&["f+%LL"]), &query).unwrap();
        assert_eq!(paths, strings(&["/a/f+00"]));
    }

    #[test]
    fn test_explicit_file_template_and_pattern_fallback() {
        let idx = index(&[
            ("ICMSHHARM+%LLLL", &[("2024-03-01 00:00:00", &[0])]),
            ("PFHARM+%LLLL.grib2", &[("2024-03-01 00:00:00", &[0])]),
        ]);
        let roots = strings(&["/a"]);
        let files = strings(&["ICMSHHARM+%LLLL", "PFHARM+%LLLL.grib2"]);

        let only_pf = reconstruct(
            &idx,
            &roots,
            &files,
            &ReconstructQuery::all().with_file_template("PFHARM+%LLLL.grib2"),
        )
        .unwrap();
        assert_eq!(only_pf, strings(&["/a/PFHARM+0000.grib2"]));

        let by_pattern = reconstruct(
            &idx,
            &roots,
            &files,
            &ReconstructQuery::all().with_file_template("ICMSH.*"),
        )
        .unwrap();
        assert_eq!(by_pattern, strings(&["/a/ICMSHHARM+0000"]));
    }

    #[test]
    fn test_unknown_template_yields_nothing() {
        let idx = index(&[("f+%LL", &[("2024-03-01 00:00:00", &[0])])]);
        let paths = reconstruct(
            &idx,
            &strings(&["/a"]),
            &strings(&["g+%LL", "(unbalanced"]),
            &ReconstructQuery::all(),
        )
        .unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_every_root_is_rendered() {
        let idx = index(&[("f+%LL", &[("2024-03-01 00:00:00", &[0])])]);
        let paths = reconstruct(
            &idx,
            &strings(&["/a/%Y", "/b/%Y/"]),
            &strings(&["f+%LL"]),
            &ReconstructQuery::all(),
        )
        .unwrap();
        assert_eq!(paths, strings(&["/a/2024/f+00", "/b/2024/f+00"]));
    }

    #[test]
    fn test_no_deduplication_across_templates() {
        let idx = index(&[("f+%LL", &[("2024-03-01 00:00:00", &[0])])]);
        let paths = reconstruct(
            &idx,
            &strings(&["/a"]),
            &strings(&["f+%LL", "f.*"]),
            &ReconstructQuery::all(),
        )
        .unwrap();
        assert_eq!(paths, strings(&["/a/f+00", "/a/f+00"]));
    }

    #[test]
    fn test_repeated_requests_are_kept() {
        let idx = index(&[("f+%LL", &[("2024-03-01 00:00:00", &[0, 3600])])]);
        let query = ReconstructQuery {
            dates: strings(&["2024-03-01 00:00:00", "2024-03-01 00:00:00"]),
            leadtimes: vec![3600, 0, 3600],
            ..ReconstructQuery::default()
        };
        let paths = reconstruct(&idx, &strings(&["/a"]), &strings(&["f+%LL"]), &query).unwrap();
        assert_eq!(
            paths,
            strings(&["/a/f+00", "/a/f+01", "/a/f+01", "/a/f+00", "/a/f+01", "/a/f+01"])
        );
    }

    #[test]
    fn test_ambiguous_template_renders_next_to_siblings() {
        let idx = index(&[
            ("ok+%LL", &[("2024-03-01 00:00:00", &[0])]),
            ("bad%LLLL_%LL", &[("2024-03-01 00:00:00", &[0])]),
        ]);
        let paths = reconstruct(
            &idx,
            &strings(&["/a"]),
            &strings(&["ok+%LL", "bad%LLLL_%LL"]),
            &ReconstructQuery::all(),
        )
        .unwrap();
        assert_eq!(paths, strings(&["/a/ok+00", "/a/bad0000_%LL"]));
    }

    #[test]
    fn test_broken_entry_does_not_abort_siblings() {
        let idx = index(&[
            ("f+%LL", &[("not a date", &[0])]),
            ("g+%LL", &[("2024-03-01 00:00:00", &[0])]),
        ]);
        let paths = reconstruct(
            &idx,
            &strings(&["/a"]),
            &strings(&["f+%LL", "g+%LL"]),
            &ReconstructQuery::all(),
        )
        .unwrap();
        assert_eq!(paths, strings(&["/a/g+00"]));
    }
}
