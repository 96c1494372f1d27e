//! The fixed table of template directives.

use std::fmt;

/// A placeholder recognized inside a path or file template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Directive {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Wildcard,
    LeadMinute,
    LeadHour4,
    LeadHour3,
    LeadHour2,
}

impl Directive {
    /// All directives in compilation priority order.
    pub const ALL: [Directive; 10] = [
        Directive::Year,
        Directive::Month,
        Directive::Day,
        Directive::Hour,
        Directive::Minute,
        Directive::Wildcard,
        Directive::LeadMinute,
        Directive::LeadHour4,
        Directive::LeadHour3,
        Directive::LeadHour2,
    ];

    /// Literal marker replaced by this directive
    pub fn marker(self) -> &'static str {
        match self {
            Directive::Year => "%Y",
            Directive::Month => "%m",
            Directive::Day => "%d",
            Directive::Hour => "%H",
            Directive::Minute => "%M",
            Directive::Wildcard => "*",
            Directive::LeadMinute => "%LM",
            Directive::LeadHour4 => "%LLLL",
            Directive::LeadHour3 => "%LLL",
            Directive::LeadHour2 => "%LL",
        }
    }

    /// Number of characters captured in a matching string (0 = free width)
    pub fn width(self) -> usize {
        match self {
            Directive::Year => 4,
            Directive::Month | Directive::Day | Directive::Hour | Directive::Minute => 2,
            Directive::Wildcard => 0,
            Directive::LeadMinute => 2,
            Directive::LeadHour4 => 4,
            Directive::LeadHour3 => 3,
            Directive::LeadHour2 => 2,
        }
    }

    /// Regex fragment capturing the directive's value
    pub fn capture_pattern(self) -> String {
        match self {
            Directive::Wildcard => "(.*)".to_string(),
            other => format!("([0-9]{{{}}})", other.width()),
        }
    }

    pub fn is_lead_hour(self) -> bool {
        matches!(
            self,
            Directive::LeadHour4 | Directive::LeadHour3 | Directive::LeadHour2
        )
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}
