//! Template compilation.
//!
//! A template such as `/archive/%Y/%m/%d/%H/ICMSHHARM+%LLLL` is compiled once
//! into a sequence of literal and directive segments. The segments drive both
//! the anchored regex used to recognise listed files and the generator that
//! renders a [`TemporalValue`](crate::temporal::TemporalValue) back into a path.

use regex::Regex;
use std::fmt;
use tracing::warn;

use super::directive::Directive;
use crate::error::{CatalogError, Result};

/// One piece of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim
    Literal(String),
    /// A placeholder substituted by a value
    Directive(Directive),
}

/// A template compiled into a matcher and a generator
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: String,
    offsets: Vec<(Directive, usize)>,
    ignored_lead_hours: Vec<Directive>,
    segments: Vec<Segment>,
    pattern: String,
    regex: Regex,
}

impl CompiledTemplate {
    /// Compile a template string.
    ///
    /// Directives are substituted in the priority order of [`Directive::ALL`].
    /// Only the first lead-hour width found (`%LLLL`, then `%LLL`, then `%LL`)
    /// is honored; other lead-hour markers stay literal text and are reported
    /// by [`ignored_lead_hours`](Self::ignored_lead_hours).
    pub fn compile(template: &str) -> Result<Self> {
        let mut segments = if template.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Literal(template.to_string())]
        };
        let mut offsets = Vec::new();

        for directive in Directive::ALL {
            let Some(first) = template.find(directive.marker()) else {
                continue;
            };
            offsets.push((directive, first));
            segments = split_segments(segments, directive);
            if directive.is_lead_hour() {
                break;
            }
        }

        // Stable sort keeps priority order for equal offsets
        offsets.sort_by_key(|&(_, offset)| offset);

        let ignored_lead_hours: Vec<Directive> = Directive::ALL
            .iter()
            .copied()
            .filter(|d| d.is_lead_hour())
            .filter(|d| !offsets.iter().any(|(honored, _)| honored == d))
            .filter(|d| {
                segments.iter().any(|segment| match segment {
                    Segment::Literal(text) => text.contains(d.marker()),
                    Segment::Directive(_) => false,
                })
            })
            .collect();
        if !ignored_lead_hours.is_empty() {
            warn!(
                template = template,
                ignored = ?ignored_lead_hours,
                "Template uses more than one lead-hour width, extra markers are treated as text"
            );
        }

        let pattern = build_pattern(&segments);
        let regex = Regex::new(&pattern).map_err(|e| CatalogError::Template {
            template: template.to_string(),
            message: format!("cannot build matcher: {}", e),
        })?;

        Ok(Self {
            template: template.to_string(),
            offsets,
            ignored_lead_hours,
            segments,
            pattern,
            regex,
        })
    }

    /// The template string this was compiled from
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Honored directives with the offset of their first marker, by offset
    pub fn offsets(&self) -> &[(Directive, usize)] {
        &self.offsets
    }

    /// Lead-hour markers left as text because another width was honored
    pub fn ignored_lead_hours(&self) -> &[Directive] {
        &self.ignored_lead_hours
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The anchored matching pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Check whether a candidate has the shape of this template
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Directives in the order their capture groups appear in the pattern
    pub fn directive_sequence(&self) -> impl Iterator<Item = Directive> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Directive(d) => Some(*d),
            Segment::Literal(_) => None,
        })
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.offsets.iter().any(|&(d, _)| d == directive)
    }

    /// Build the strftime string for a value with the given lead time.
    ///
    /// Lead-time markers are replaced by zero padded numbers, calendar markers
    /// are kept for chrono, and wildcards take the next `fill` text (or `*`).
    /// Literal text, including ignored lead-hour markers, is escaped so it
    /// renders verbatim.
    pub(crate) fn strftime_string<'a>(
        &self,
        leadtime_seconds: u64,
        fill: &mut impl Iterator<Item = &'a str>,
    ) -> String {
        let hours = leadtime_seconds / 3600;
        let minutes = (leadtime_seconds % 3600) / 60;

        let mut out = String::with_capacity(self.template.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(&text.replace('%', "%%")),
                Segment::Directive(Directive::Wildcard) => match fill.next() {
                    Some(text) => out.push_str(&text.replace('%', "%%")),
                    None => out.push('*'),
                },
                Segment::Directive(Directive::LeadMinute) => {
                    out.push_str(&format!("{:02}", minutes));
                }
                Segment::Directive(d) if d.is_lead_hour() => {
                    out.push_str(&format!("{:0width$}", hours, width = d.width()));
                }
                Segment::Directive(d) => out.push_str(d.marker()),
            }
        }
        out
    }
}

impl fmt::Display for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl PartialEq for CompiledTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for CompiledTemplate {}

/// Split every literal segment on the directive's marker
fn split_segments(segments: Vec<Segment>, directive: Directive) -> Vec<Segment> {
    let marker = directive.marker();
    let mut out = Vec::with_capacity(segments.len() * 2);

    for segment in segments {
        let text = match segment {
            Segment::Literal(text) if text.contains(marker) => text,
            other => {
                out.push(other);
                continue;
            }
        };

        let mut parts = text.split(marker).peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                out.push(Segment::Literal(part.to_string()));
            }
            if parts.peek().is_some() {
                out.push(Segment::Directive(directive));
            }
        }
    }
    out
}

fn build_pattern(segments: &[Segment]) -> String {
    let mut pattern = String::from("^");
    for segment in segments {
        match segment {
            Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
            Segment::Directive(d) => pattern.push_str(&d.capture_pattern()),
        }
    }
    pattern.push('$');
    pattern
}

/// Join a path remainder and a file template with a single `/`
pub fn join_template(prefix: &str, file_template: &str) -> String {
    if prefix.is_empty() {
        file_template.to_string()
    } else if prefix.ends_with('/') {
        format!("{}{}", prefix, file_template)
    } else {
        format!("{}/{}", prefix, file_template)
    }
}
