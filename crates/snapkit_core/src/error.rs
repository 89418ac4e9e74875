//! Error types for snapkit_core
//!
//! Resolution itself never fails; these cover the edges of the system where
//! text is parsed or trees are assembled.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to parse a computed-style value from CSS text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    /// Unknown `scroll-snap-type` axis keyword
    #[error("Unknown scroll-snap-type axis: {0}")]
    SnapType(String),

    /// Unknown `writing-mode` keyword
    #[error("Unknown writing-mode: {0}")]
    WritingMode(String),

    /// A length that is neither `auto` nor a number with an optional `px` unit
    #[error("Invalid length: {0}")]
    Length(String),

    /// A box shorthand with more than four components
    #[error("Invalid edge shorthand: {0}")]
    Edges(String),

    /// A declaration without a `property: value` form
    #[error("Malformed declaration: {0}")]
    Declaration(String),
}

/// Errors while assembling a [`SnapTree`](crate::tree::SnapTree)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The parent element was removed or never existed
    #[error("Parent element no longer exists")]
    DeadParent,
}

/// Errors while loading or validating an [`EngineConfig`](crate::config::EngineConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for config operations
pub type Result<T> = std::result::Result<T, ConfigError>;
