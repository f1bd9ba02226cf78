//! Problems with the runner's JSON config file.

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("Config Read Error: {}: {source} {location}", path.display())]
    ReadError {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON, or a field has the wrong type.
    #[error("Config Parse Error: {}:{line}:{column}: {reason} {location}", path.display())]
    ParseError {
        path: PathBuf,
        line: usize,
        column: usize,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Config Validation Error: {reason} {location}")]
    ValidationError {
        reason: String,
        location: ErrorLocation,
    },
}

impl ConfigError {
    #[track_caller]
    pub fn read_error(path: &Path, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }

    /// Keeps the position serde_json reports so the user can find the typo.
    #[track_caller]
    pub fn parse_error(path: &Path, error: &serde_json::Error) -> Self {
        ConfigError::ParseError {
            path: path.to_path_buf(),
            line: error.line(),
            column: error.column(),
            reason: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation(reason: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
