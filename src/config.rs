//! Configuration management for nwpcat.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::{ArgAction, ArgGroup, Parser};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::Selection;
use crate::error::{CatalogError, Result};
use crate::reconstruct::ReconstructQuery;
use crate::temporal;

static ATOS_HOST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^a[a-d]").expect("host pattern"));

/// Command-line arguments for nwpcat
#[derive(Parser, Debug)]
#[command(name = "nwpcat")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["list", "scan", "reconstruct", "check"])
))]
pub struct Args {
    /// Directory holding one sub-directory per case
    #[arg(short = 'p', long, env = "NWPCAT_CASES_PATH")]
    pub cases_path: Option<PathBuf>,

    /// Host whose path templates are used (default: detected)
    #[arg(short = 'H', long, env = "NWPCAT_HOST")]
    pub host: Option<String>,

    /// Cases to work with, as case1[:case2:...]
    #[arg(short, long)]
    pub case: Option<String>,

    /// Experiments to work with within one case, as exp1[:exp2:...]
    #[arg(short, long)]
    pub exp: Option<String>,

    /// List cases and experiments
    #[arg(long)]
    pub list: bool,

    /// Scan the archive and rewrite the stored index
    #[arg(long)]
    pub scan: bool,

    /// Print the paths of indexed files
    #[arg(long)]
    pub reconstruct: bool,

    /// Check that the newest indexed file of every template exists
    #[arg(long)]
    pub check: bool,

    /// Increase verbosity
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease verbosity
    #[arg(short = 's', action = ArgAction::Count)]
    pub silent: u8,

    /// Dates to reconstruct, comma separated (YYYY-MM-DD[ HH[:MM[:SS]]])
    #[arg(long, value_delimiter = ',', conflicts_with = "sdate")]
    pub dates: Vec<String>,

    /// First date of a date range
    #[arg(long)]
    pub sdate: Option<String>,

    /// Last date of a date range (default: the first date)
    #[arg(long, requires = "sdate")]
    pub edate: Option<String>,

    /// Date range step, seconds or H:M:S (default: 24:00:00)
    #[arg(long, requires = "sdate")]
    pub step: Option<String>,

    /// Lead times to reconstruct in seconds, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "stime")]
    pub leadtimes: Vec<u64>,

    /// First lead time of a range, seconds or H:M:S
    #[arg(long)]
    pub stime: Option<String>,

    /// Last lead time of a range (default: the first lead time)
    #[arg(long, requires = "stime")]
    pub etime: Option<String>,

    /// Lead time range step, seconds or H:M:S (default: 1:00:00)
    #[arg(long, requires = "stime")]
    pub leadtime_step: Option<String>,

    /// Only reconstruct this file template (exact or regular expression)
    #[arg(long)]
    pub file_template: Option<String>,

    /// Path to JSON configuration file
    #[arg(long, env = "NWPCAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NWPCAT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Where cases live and which host's paths apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding one sub-directory per case
    #[serde(default = "default_cases_path")]
    pub cases_path: PathBuf,

    /// Host name used to pick path templates (None = detect)
    #[serde(default)]
    pub host: Option<String>,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Base verbosity of listings, adjusted by -v and -s
    #[serde(default)]
    pub verbosity: i32,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub report: ReportConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// What a run does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Scan,
    Reconstruct(ReconstructQuery),
    Check,
}

/// The resolved request of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub selection: Selection,
    pub verbosity: i32,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Command)> {
        Self::from_args(Args::parse())
    }

    /// Resolve parsed arguments against the config file and defaults
    pub fn from_args(args: Args) -> Result<(Self, Command)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments and environment
        if let Some(cases_path) = &args.cases_path {
            config.catalog.cases_path = cases_path.clone();
        }
        if args.host.is_some() {
            config.catalog.host = args.host.clone();
        }
        if let Some(log_level) = &args.log_level {
            config.log_level = log_level.clone();
        }
        if config.catalog.host.is_none() {
            config.catalog.host = detect_host();
        }

        let command = Command {
            action: action_from_args(&args)?,
            selection: Selection::from_args(args.case.as_deref(), args.exp.as_deref())?,
            verbosity: config.report.verbosity + i32::from(args.verbose) - i32::from(args.silent),
        };

        Ok((config, command))
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.catalog.cases_path = other.catalog.cases_path;
        if other.catalog.host.is_some() {
            self.catalog.host = other.catalog.host;
        }
        self.report = other.report;
        self.log_level = other.log_level;
    }

    /// The host, once resolved
    pub fn host(&self) -> Result<&str> {
        self.catalog
            .host
            .as_deref()
            .ok_or_else(|| CatalogError::Config {
                message: "Could not determine the host, give --host".to_string(),
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.cases_path.as_os_str().is_empty() {
            return Err(CatalogError::Config {
                message: "Cases path cannot be empty".to_string(),
            });
        }

        match self.catalog.host.as_deref() {
            Some(host) if !host.trim().is_empty() => {}
            _ => {
                return Err(CatalogError::Config {
                    message: "Could not determine the host, give --host".to_string(),
                });
            }
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(CatalogError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

fn action_from_args(args: &Args) -> Result<Action> {
    if args.list {
        Ok(Action::List)
    } else if args.scan {
        Ok(Action::Scan)
    } else if args.check {
        Ok(Action::Check)
    } else if args.reconstruct {
        Ok(Action::Reconstruct(query_from_args(args)?))
    } else {
        Err(CatalogError::Config {
            message: "One of --list, --scan, --reconstruct or --check must be given".to_string(),
        })
    }
}

/// Build the reconstruction query from explicit lists or ranges
pub fn query_from_args(args: &Args) -> Result<ReconstructQuery> {
    let dates = if !args.dates.is_empty() {
        args.dates
            .iter()
            .map(|date| temporal::parse_date_arg(date).map(|dt| temporal::format_dtg(&dt)))
            .collect::<Result<Vec<_>>>()?
    } else if let Some(sdate) = &args.sdate {
        let start = temporal::parse_date_arg(sdate)?;
        let end = match &args.edate {
            Some(edate) => temporal::parse_date_arg(edate)?,
            None => start,
        };
        let step = temporal::parse_step(args.step.as_deref().unwrap_or("24:00:00"))?;
        temporal::expand_dates(start, end, step)?
            .iter()
            .map(temporal::format_dtg)
            .collect()
    } else {
        Vec::new()
    };

    let leadtimes = if !args.leadtimes.is_empty() {
        args.leadtimes.clone()
    } else if let Some(stime) = &args.stime {
        let start = temporal::parse_step(stime)?;
        let end = match &args.etime {
            Some(etime) => temporal::parse_step(etime)?,
            None => start,
        };
        let step = temporal::parse_step(args.leadtime_step.as_deref().unwrap_or("1:00:00"))?;
        temporal::expand_leadtimes(start, end, step)?
    } else {
        Vec::new()
    };

    Ok(ReconstructQuery {
        dates,
        leadtimes,
        file_template: args.file_template.clone(),
    })
}

/// Host name of this machine, with ECMWF Atos nodes mapped to `atos`
pub fn detect_host() -> Option<String> {
    let raw = std::env::var("HOSTNAME")
        .ok()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())?;
    normalize_host(raw.trim())
}

pub fn normalize_host(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else if ATOS_HOST.is_match(name) {
        Some("atos".to_string())
    } else {
        Some(name.to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            report: ReportConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cases_path: default_cases_path(),
            host: None,
        }
    }
}

// Default value functions for serde
fn default_cases_path() -> PathBuf {
    PathBuf::from("cases")
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["nwpcat"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog.cases_path, PathBuf::from("cases"));
        assert_eq!(config.catalog.host, None);
        assert_eq!(config.report.verbosity, 0);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config1.catalog.host = Some("atos".to_string());
        config2.catalog.cases_path = PathBuf::from("/data/cases");
        config2.report.verbosity = 2;

        config1.merge(config2);

        assert_eq!(config1.catalog.cases_path, PathBuf::from("/data/cases"));
        assert_eq!(config1.catalog.host, Some("atos".to_string()));
        assert_eq!(config1.report.verbosity, 2);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.catalog.host = Some("atos".to_string());
        assert!(config.validate().is_ok());

        let mut invalid = config.clone();
        invalid.catalog.cases_path = PathBuf::new();
        assert!(invalid.validate().is_err());

        let mut invalid = config.clone();
        invalid.catalog.host = None;
        assert!(invalid.validate().is_err());

        let mut invalid = config.clone();
        invalid.log_level = "invalid".to_string();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_exactly_one_action() {
        let none: Vec<&str> = vec!["nwpcat", "-H", "atos"];
        assert!(Args::try_parse_from(none).is_err());
        assert!(Args::try_parse_from(["nwpcat", "--list", "--scan"]).is_err());
        assert!(parse(&["--scan"]).scan);
    }

    #[test]
    fn test_command_from_args() {
        let args = parse(&["--list", "-H", "lumi", "-c", "case_a", "-e", "x:y", "-vv", "-s"]);
        let (config, command) = Config::from_args(args).unwrap();

        assert_eq!(config.host().unwrap(), "lumi");
        assert_eq!(command.action, Action::List);
        assert_eq!(command.verbosity, 1);
        assert_eq!(
            command.selection.experiments("case_a"),
            ["x".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn test_config_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nwpcat.json");
        std::fs::write(
            &path,
            r#"{"catalog": {"cases_path": "/srv/cases", "host": "atos"}, "report": {"verbosity": 1}}"#,
        )
        .unwrap();

        let args = parse(&["--list", "--config", path.to_str().unwrap(), "-v"]);
        let (config, command) = Config::from_args(args).unwrap();
        assert_eq!(config.catalog.cases_path, PathBuf::from("/srv/cases"));
        assert_eq!(config.host().unwrap(), "atos");
        assert_eq!(command.verbosity, 2);
    }

    #[test]
    fn test_reconstruct_ranges() {
        let args = parse(&[
            "--reconstruct",
            "--sdate",
            "2024-03-01",
            "--edate",
            "2024-03-02 00",
            "--step",
            "12:00:00",
            "--stime",
            "0",
            "--etime",
            "2:00:00",
            "--file-template",
            "ICMSH.*",
        ]);
        let query = query_from_args(&args).unwrap();
        assert_eq!(
            query.dates,
            vec![
                "2024-03-01 00:00:00",
                "2024-03-01 12:00:00",
                "2024-03-02 00:00:00"
            ]
        );
        assert_eq!(query.leadtimes, vec![0, 3600, 7200]);
        assert_eq!(query.file_template.as_deref(), Some("ICMSH.*"));
    }

    #[test]
    fn test_reconstruct_lists() {
        let args = parse(&[
            "--reconstruct",
            "--dates",
            "2024-03-01 06,2024-03-01",
            "--leadtimes",
            "0,10800",
        ]);
        let query = query_from_args(&args).unwrap();
        assert_eq!(query.dates, vec!["2024-03-01 06:00:00", "2024-03-01 00:00:00"]);
        assert_eq!(query.leadtimes, vec![0, 10800]);
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("ac6-102"), Some("atos".to_string()));
        assert_eq!(normalize_host("lumi-uan01"), Some("lumi-uan01".to_string()));
        assert_eq!(normalize_host("ae1"), Some("ae1".to_string()));
        assert_eq!(normalize_host(""), None);
    }
}
