//! Logging utilities for nwpcat.
//!
//! This module provides structured logging helpers so scan and
//! reconstruction runs leave searchable records of what was looked at and
//! what was found.

use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::CatalogError;
use crate::index::DateIndex;

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    // A second initialization (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration = start_time.elapsed();
    let duration_ms = duration.as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let operation_id = generate_operation_id();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        "Starting operation"
    );

    let result = f();

    let duration = start.elapsed();

    info!(
        operation = operation,
        operation_id = %operation_id,
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log what a path template scan produced
pub fn log_scan_stats(path_template: &str, listed: usize, files: &BTreeMap<String, DateIndex>) {
    let dates: usize = files.values().map(|dates| dates.len()).sum();
    let leadtimes: usize = files
        .values()
        .flat_map(|dates| dates.values())
        .map(|leadtimes| leadtimes.len())
        .sum();
    let empty: Vec<&str> = files
        .iter()
        .filter(|(_, dates)| dates.is_empty())
        .map(|(file_template, _)| file_template.as_str())
        .collect();

    info!(
        operation = "scan",
        path_template = path_template,
        listed = listed,
        file_templates = files.len(),
        dates = dates,
        leadtimes = leadtimes,
        "Path template scanned"
    );
    if !empty.is_empty() {
        debug!(
            path_template = path_template,
            empty = %empty.join(", "),
            "File templates without matches"
        );
    }
}

/// Log an error with context
pub fn log_error(error: &CatalogError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Generate a unique operation ID
pub fn generate_operation_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_generate_operation_id() {
        let id1 = generate_operation_id();
        let id2 = generate_operation_id();

        assert!(!id1.is_empty());
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_log_timed_operation() {
        let result = log_timed_operation("test_operation", || {
            std::thread::sleep(Duration::from_millis(1));
            42
        });

        assert_eq!(result, 42);
    }

    #[test]
    fn test_log_scan_stats_handles_empty_templates() {
        let mut files = BTreeMap::new();
        files.insert("ICMSHHARM+%LLLL".to_string(), DateIndex::new());
        log_scan_stats("/archive/%Y/", 0, &files);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing("debug");
        init_tracing("info");
    }
}
