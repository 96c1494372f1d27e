//! Calendar instants extended with a forecast lead time.
//!
//! A [`TemporalValue`] is what a template describes: the analysis time of a
//! forecast plus how far into the forecast a file is. [`parse`] and [`format`]
//! convert between values and strings through a [`CompiledTemplate`], and
//! parsing only succeeds when formatting the result reproduces the input.

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write;
use std::time::Duration;

use crate::error::{CatalogError, Result};
use crate::template::{CompiledTemplate, Directive};

/// Format of the date strings used as index keys
pub const DTG_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A calendar date-time plus a non-negative lead time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemporalValue {
    datetime: NaiveDateTime,
    leadtime: Duration,
}

impl Default for TemporalValue {
    fn default() -> Self {
        Self::new(base_datetime())
    }
}

impl TemporalValue {
    /// Create a value with a zero lead time
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            leadtime: Duration::ZERO,
        }
    }

    pub fn with_leadtime(datetime: NaiveDateTime, leadtime: Duration) -> Self {
        Self { datetime, leadtime }
    }

    /// Build a value from an index date string and lead time in seconds
    pub fn from_dtg(dtg: &str, leadtime_seconds: u64) -> Result<Self> {
        Ok(Self::with_leadtime(
            parse_dtg(dtg)?,
            Duration::from_secs(leadtime_seconds),
        ))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }

    pub fn leadtime(&self) -> Duration {
        self.leadtime
    }

    /// Lead time in whole seconds
    pub fn leadtime_seconds(&self) -> u64 {
        self.leadtime.as_secs()
    }

    /// Replace the calendar part, keeping the lead time unless a new one is given
    pub fn replace(&self, datetime: NaiveDateTime, leadtime: Option<Duration>) -> Self {
        Self {
            datetime,
            leadtime: leadtime.unwrap_or(self.leadtime),
        }
    }

    /// Replace year, month and day, keeping time of day and lead time
    pub fn replace_date(&self, date: NaiveDate) -> Self {
        self.replace(date.and_time(self.datetime.time()), None)
    }

    /// The canonical index key for this value's calendar part
    pub fn dtg(&self) -> String {
        format_dtg(&self.datetime)
    }
}

/// Parse a candidate string with a compiled template.
///
/// Fields missing from the template default to 1900-01-01 00:00 and a zero
/// lead time. Fails with [`CatalogError::ParseMismatch`] when the candidate
/// does not have the template's shape and [`CatalogError::RoundTrip`] when the
/// parsed value does not format back to the candidate.
pub fn parse(template: &CompiledTemplate, candidate: &str) -> Result<TemporalValue> {
    let mismatch = || CatalogError::ParseMismatch {
        template: template.as_str().to_string(),
        candidate: candidate.to_string(),
    };

    let captures = template.regex().captures(candidate).ok_or_else(mismatch)?;

    let (mut year, mut month, mut day, mut hour, mut minute) = (1900, 1, 1, 0, 0);
    let (mut lead_hours, mut lead_minutes) = (0u64, 0u64);
    let mut fill = Vec::new();

    for (index, directive) in template.directive_sequence().enumerate() {
        let text = captures.get(index + 1).map_or("", |m| m.as_str());
        if directive == Directive::Wildcard {
            fill.push(text);
            continue;
        }

        let value: u32 = text.parse().map_err(|_| mismatch())?;
        match directive {
            Directive::Year => year = value as i32,
            Directive::Month => month = value,
            Directive::Day => day = value,
            Directive::Hour => hour = value,
            Directive::Minute => minute = value,
            Directive::LeadMinute => lead_minutes = u64::from(value),
            Directive::LeadHour4 | Directive::LeadHour3 | Directive::LeadHour2 => {
                lead_hours = u64::from(value)
            }
            Directive::Wildcard => {}
        }
    }

    let datetime = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(mismatch)?;
    let value = TemporalValue::with_leadtime(
        datetime,
        Duration::from_secs(lead_hours * 3600 + lead_minutes * 60),
    );

    let rendered = render(template, &value, &mut fill.into_iter())?;
    if rendered != candidate {
        return Err(CatalogError::RoundTrip {
            template: template.as_str().to_string(),
            candidate: candidate.to_string(),
            rendered,
        });
    }

    Ok(value)
}

/// Format a value with a compiled template.
///
/// Lead hours are `floor(seconds / 3600)` padded to the directive width and
/// lead minutes `floor((seconds % 3600) / 60)` padded to two digits; the
/// remaining calendar markers go through chrono's strftime. Literal text,
/// `%` included, is copied verbatim and wildcards are rendered as a literal
/// `*`.
pub fn format(template: &CompiledTemplate, value: &TemporalValue) -> Result<String> {
    render(template, value, &mut std::iter::empty())
}

fn render<'a>(
    template: &CompiledTemplate,
    value: &TemporalValue,
    fill: &mut impl Iterator<Item = &'a str>,
) -> Result<String> {
    let format_str = template.strftime_string(value.leadtime_seconds(), fill);
    strftime(&value.datetime, &format_str).map_err(|message| CatalogError::Template {
        template: template.as_str().to_string(),
        message,
    })
}

/// strftime that reports bad specifiers instead of panicking
fn strftime(datetime: &NaiveDateTime, format_str: &str) -> std::result::Result<String, String> {
    let items: Vec<Item> = StrftimeItems::new(format_str).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(format!("unsupported format specifier in '{}'", format_str));
    }

    let mut out = String::with_capacity(format_str.len() + 8);
    write!(out, "{}", datetime.format_with_items(items.iter()))
        .map_err(|_| format!("'{}' needs a time zone", format_str))?;
    Ok(out)
}

fn base_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::default())
}

/// Parse an index date string (`YYYY-MM-DD HH:MM:SS`)
pub fn parse_dtg(dtg: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(dtg, DTG_FORMAT).map_err(|e| CatalogError::InvalidDate {
        value: dtg.to_string(),
        message: e.to_string(),
    })
}

pub fn format_dtg(datetime: &NaiveDateTime) -> String {
    datetime.format(DTG_FORMAT).to_string()
}

/// Parse a user supplied date: `YYYY-MM-DD[ HH[:MM[:SS]]]`
pub fn parse_date_arg(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    let parsed = match value.len() {
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::default())),
        13 => NaiveDateTime::parse_from_str(&format!("{}:00", value), "%Y-%m-%d %H:%M"),
        16 => NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"),
        _ => NaiveDateTime::parse_from_str(value, DTG_FORMAT),
    };
    parsed.map_err(|e| CatalogError::InvalidDate {
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Render a template for an index date string and a lead time in seconds
pub fn render_dtg(template: &CompiledTemplate, dtg: &str, leadtime_seconds: u64) -> Result<String> {
    format(template, &TemporalValue::from_dtg(dtg, leadtime_seconds)?)
}

/// Split a lead time in seconds into whole hours and remaining minutes
pub fn leadtime_to_hm(seconds: u64) -> (u64, u64) {
    (seconds / 3600, (seconds % 3600) / 60)
}

/// Parse a step given either as seconds or as `H:M:S` (hours may exceed 24)
pub fn parse_step(step: &str) -> Result<Duration> {
    let invalid = |message: &str| CatalogError::InvalidDate {
        value: step.to_string(),
        message: message.to_string(),
    };

    let step = step.trim();
    if let Ok(seconds) = step.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let parts: Vec<&str> = step.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid("expected seconds or H:M:S"));
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| invalid("step fields must be non-negative integers"))?;
    }
    let [hours, minutes, seconds] = numbers;
    Ok(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

/// All date-times from `start` to `end` inclusive, `step` apart
pub fn expand_dates(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
) -> Result<Vec<NaiveDateTime>> {
    if step.is_zero() {
        return Err(CatalogError::Config {
            message: "Date step must be positive".to_string(),
        });
    }
    let step = chrono::Duration::from_std(step).map_err(|e| CatalogError::Config {
        message: format!("Date step out of range: {}", e),
    })?;

    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        match current.checked_add_signed(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(dates)
}

/// All lead times (in seconds) from `start` to `end` inclusive, `step` apart
pub fn expand_leadtimes(start: Duration, end: Duration, step: Duration) -> Result<Vec<u64>> {
    if step.is_zero() {
        return Err(CatalogError::Config {
            message: "Lead time step must be positive".to_string(),
        });
    }

    let mut leadtimes = Vec::new();
    let mut current = start;
    while current <= end {
        leadtimes.push(current.as_secs());
        current += step;
    }
    Ok(leadtimes)
}
