//! Error types for configuration loading and validation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration existed, so a template was written for the operator to edit.
    #[error("configuration template written to {path}; edit it and run again")]
    TemplateCreated {
        /// Location of the new template.
        path: PathBuf,
    },
    /// A template placeholder was never replaced.
    #[error("'{field}' still holds the template placeholder; edit the configuration file")]
    Placeholder {
        /// Dotted field path.
        field: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid value for '{field}' in '{section}': {message}")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable error description.
        message: String,
    },
    /// Identifier pattern did not compile.
    #[error("identifier '{field}' is not a valid regular expression")]
    InvalidPattern {
        /// Identifier field name.
        field: &'static str,
        /// Source regex error.
        source: regex::Error,
    },
    /// The document was not valid JSON for the settings shape.
    #[error("failed to parse configuration at {path}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
