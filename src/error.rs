//! Error types for the nwpcat catalog.
//!
//! This module defines the error enum shared by the template engine, the
//! scanner, the index store and the catalog layer.

use thiserror::Error;

/// The main error type for nwpcat operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML errors while reading case metadata
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A template that cannot be rendered
    #[error("Template error in '{template}': {message}")]
    Template { template: String, message: String },

    /// The candidate string does not have the shape of the template
    #[error("'{candidate}' does not match template '{template}'")]
    ParseMismatch { template: String, candidate: String },

    /// The parsed value does not format back to the candidate string
    #[error("'{candidate}' parsed with template '{template}' formats back as '{rendered}'")]
    RoundTrip {
        template: String,
        candidate: String,
        rendered: String,
    },

    /// Invalid date strings or calendar values
    #[error("Invalid date '{value}': {message}")]
    InvalidDate { value: String, message: String },

    /// Requested case does not exist
    #[error("Case not found: {name}")]
    CaseNotFound { name: String },

    /// Requested experiment does not exist within a case
    #[error("Experiment not found: {case}/{name}")]
    ExperimentNotFound { case: String, name: String },
}

impl CatalogError {
    /// True for the errors a scan treats as "this file is not for this template"
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            CatalogError::ParseMismatch { .. } | CatalogError::RoundTrip { .. }
        )
    }
}

/// Convenience type alias for Results with CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;
