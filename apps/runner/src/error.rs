use bridge_core::CoreError;
use bridge_core::error::{ConfigError, LaunchError};

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that end a `neurun` run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Error from the runner itself (logging, directories)
    #[error("Runner Error: {message} {location}")]
    Runner {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bridge-core (config, launch)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
        #[source]
        source: CoreError,
    },
}

impl RunnerError {
    #[track_caller]
    pub fn runner(message: impl Into<String>) -> Self {
        RunnerError::Runner {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    fn core(source: CoreError) -> Self {
        RunnerError::Core {
            message: source.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }
}

impl From<CoreError> for RunnerError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        RunnerError::core(error)
    }
}

impl From<ConfigError> for RunnerError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        RunnerError::core(CoreError::Config(error))
    }
}

impl From<LaunchError> for RunnerError {
    #[track_caller]
    fn from(error: LaunchError) -> Self {
        RunnerError::core(CoreError::Launch(error))
    }
}
