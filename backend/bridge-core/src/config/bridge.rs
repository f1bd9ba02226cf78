use crate::{DEFAULT_AUTH_FILE, DEV_EXTENSION_ID};

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_COMMAND_CAPACITY: usize = 256;

/// Settings for one bridge session.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Credential file the native process writes on startup.
    pub auth_file: PathBuf,
    /// Extension id presented in the WebSocket query string.
    pub extension_id: String,
    /// Fixed delay before retrying a failed open.
    pub reconnect_delay: Duration,
    /// Buffer size of the session command channel.
    pub command_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            auth_file: PathBuf::from(DEFAULT_AUTH_FILE),
            extension_id: DEV_EXTENSION_ID.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

impl BridgeConfig {
    pub fn with_auth_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth_file = path.into();
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}
