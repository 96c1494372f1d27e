//! Text summaries of experiments, cases and catalogs.
//!
//! The verbosity level decides how much of an index is shown:
//!
//! - below 2: first and last date plus the overall lead time range
//! - 2: the lead time range of every date
//! - 3 and above: every lead time, grouped by hour
//!
//! From level 2 on an example path is added for each file template.

use crate::error::Result;
use crate::index::{DateIndex, LeadTimes};
use crate::reconstruct::ReconstructQuery;
use crate::temporal::leadtime_to_hm;

use super::experiment::Experiment;

/// Lead time as `HHhMMm`
pub fn format_hm(seconds: u64) -> String {
    let (hours, minutes) = leadtime_to_hm(seconds);
    format!("{:02}h{:02}m", hours, minutes)
}

/// Lead times grouped by hour, one `HHh : MM,MM,...m` line per hour
pub fn group_by_hour(leadtimes: &LeadTimes) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<(u64, Vec<String>)> = None;

    for &leadtime in leadtimes {
        let (hours, minutes) = leadtime_to_hm(leadtime);
        let same_hour = matches!(&current, Some((hour, _)) if *hour == hours);
        if !same_hour {
            if let Some((hour, list)) = current.take() {
                lines.push(format!("{:02}h : {}m", hour, list.join(",")));
            }
            current = Some((hours, Vec::new()));
        }
        if let Some((_, list)) = current.as_mut() {
            list.push(format!("{:02}", minutes));
        }
    }
    if let Some((hour, list)) = current {
        lines.push(format!("{:02}h : {}m", hour, list.join(",")));
    }
    lines
}

fn leadtime_range(dates: &DateIndex) -> Option<(u64, u64)> {
    let first = dates.values().filter_map(|l| l.iter().next()).min()?;
    let last = dates.values().filter_map(|l| l.iter().next_back()).max()?;
    Some((*first, *last))
}

fn domain_text(domain: &serde_yaml::Value) -> String {
    match domain {
        serde_yaml::Value::Null => "-".to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{:?}", other)),
    }
}

pub(crate) fn experiment_summary(experiment: &Experiment, level: i32) -> Result<String> {
    let mut lines = vec![
        String::new(),
        format!("  {}", experiment.name()),
        format!("   File templates: [{}]", experiment.file_templates().join(", ")),
        format!("   Path template : [{}]", experiment.path_templates().join(", ")),
        format!("   Domain: {}", domain_text(experiment.domain())),
    ];

    for file_template in experiment.file_templates() {
        let Some(dates) = experiment.index().dates(file_template) else {
            continue;
        };
        lines.push(format!("   File: {}", file_template));

        let (Some(first_date), Some(last_date)) = (dates.keys().next(), dates.keys().next_back())
        else {
            lines.push("    No dates indexed".to_string());
            continue;
        };

        if level < 2 {
            lines.push(format!("    Dates: {} - {}", first_date, last_date));
            if let Some((start, end)) = leadtime_range(dates) {
                lines.push(format!("    Leadtimes:{} - {}", format_hm(start), format_hm(end)));
            }
        } else if level < 3 {
            for (dtg, leadtimes) in dates {
                if let (Some(start), Some(end)) = (leadtimes.iter().next(), leadtimes.iter().next_back()) {
                    lines.push(format!("    {} : {} - {}", dtg, format_hm(*start), format_hm(*end)));
                }
            }
        } else {
            for (dtg, leadtimes) in dates {
                lines.push(format!("    {} :", dtg));
                lines.extend(group_by_hour(leadtimes).into_iter().map(|line| format!("       {}", line)));
            }
        }

        if level > 1 {
            let newest: Vec<u64> = dates[first_date].iter().next_back().copied().into_iter().collect();
            let query = ReconstructQuery::for_date(first_date.as_str())
                .with_leadtimes(newest)
                .with_file_template(file_template.as_str());
            let example = experiment.reconstruct(&query)?;
            lines.push(format!("    Example: [{}]", example.join(", ")));
        }
    }

    Ok(lines.join("\n"))
}
