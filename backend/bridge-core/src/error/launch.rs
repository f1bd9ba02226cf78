use common::ErrorLocation;

use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures while starting the native process.
///
/// All of these are fatal for the launch attempt; none of them is retried.
#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error("Unsupported Platform Error: {os}_{arch} {location}")]
    UnsupportedPlatform {
        os: String,
        arch: String,
        location: ErrorLocation,
    },

    #[error("Permission Error: {message} {location}")]
    Permission {
        message: String,
        location: ErrorLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("Spawn Error: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl LaunchError {
    #[track_caller]
    pub fn unsupported_platform(os: impl Into<String>, arch: impl Into<String>) -> Self {
        LaunchError::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
