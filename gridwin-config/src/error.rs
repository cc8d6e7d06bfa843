//! Typed error variants for the gridwin-config crate.
//!
//! Callers that work with `anyhow` get these coerced automatically; callers
//! that care can match on the specific failure mode.

use thiserror::Error;

/// Errors that can occur when loading, validating or saving configuration
/// and window state files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing a file.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file contained invalid YAML.
    #[error("YAML parse error in config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// The window state file could not be encoded or decoded.
    #[error("JSON error in window state: {0}")]
    Json(#[from] serde_json::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string names the field and the reason.
    #[error("Config validation error: {0}")]
    Validation(String),
}
