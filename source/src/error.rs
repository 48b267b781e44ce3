//! Error types for schema sources.
//!
//! Failures fall into three groups: the schema could not be found
//! ([`SourceError::NotFound`]), it was found but could not be read or
//! parsed ([`SourceError::Io`], [`SourceError::Json`], [`SourceError::Yaml`],
//! [`SourceError::UnsupportedFormat`]), or it parsed but is not a usable
//! schema ([`SourceError::Invalid`]).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while locating or loading a schema.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No schema file exists at any searched location.
    #[error("no schema file found in '{}' (searched: {})", dir.display(), searched.join(", "))]
    NotFound {
        /// Directory the search ran in.
        dir: PathBuf,
        /// File names that were tried, in order.
        searched: Vec<String>,
    },

    /// File I/O failure.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("failed to parse JSON schema '{origin}': {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed YAML.
    #[error("failed to parse YAML schema '{origin}': {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// File extension does not map to a known format.
    #[error("unsupported schema format for '{}' (expected .json, .yaml or .yml)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Well-formed document that is not a valid schema.
    #[error("invalid schema '{origin}': {reason}")]
    Invalid { origin: String, reason: String },

    /// Malformed project configuration file.
    #[error("invalid config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl SourceError {
    /// Returns `true` if no schema could be located.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }

    /// Returns `true` if a schema was read but rejected for its shape or
    /// content.
    pub fn is_invalid(&self) -> bool {
        matches!(self, SourceError::Invalid { .. })
    }
}

/// Convenience alias for results with [`SourceError`].
pub type Result<T> = std::result::Result<T, SourceError>;
