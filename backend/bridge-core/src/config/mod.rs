mod bridge;

pub use bridge::{BridgeConfig, DEFAULT_COMMAND_CAPACITY, DEFAULT_RECONNECT_DELAY};

use crate::error::config::ConfigError;
use crate::lifecycle::LaunchSpec;
use crate::{DEFAULT_AUTH_FILE, DEV_EXTENSION_ID};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "neurun.json";

const MIN_RECONNECT_DELAY_MS: u64 = 1;
const MAX_RECONNECT_DELAY_MS: u64 = 60_000;
const ALLOWED_URL_SCHEMES: [&str; 3] = ["http", "https", "file"];

// ============================================
// CONFIG STRUCT
// ============================================

/// On-disk configuration for the `neurun` runner.
///
/// Every field has a default so a partial file (or no file at all) is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Page the native window loads.
    #[serde(default = "default_url")]
    pub url: String,

    /// Window options, each turned into a `--window-*` flag.
    #[serde(default)]
    pub window: BTreeMap<String, Value>,

    /// Directory holding the native binaries.
    #[serde(default = "default_binary_dir")]
    pub binary_dir: PathBuf,

    /// Explicit binary file name; skips platform lookup when set.
    #[serde(default)]
    pub binary_name: Option<String>,

    #[serde(default = "default_auth_file")]
    pub auth_file: PathBuf,

    #[serde(default = "default_extension_id")]
    pub extension_id: String,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            window: BTreeMap::new(),
            binary_dir: default_binary_dir(),
            binary_name: None,
            auth_file: default_auth_file(),
            extension_id: default_extension_id(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            log_dir: None,
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_url() -> String {
    "/".to_string()
}
fn default_binary_dir() -> PathBuf {
    PathBuf::from("bin")
}
fn default_auth_file() -> PathBuf {
    PathBuf::from(DEFAULT_AUTH_FILE)
}
fn default_extension_id() -> String {
    DEV_EXTENSION_ID.to_string()
}
fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY.as_millis() as u64
}

// ============================================
// IMPLEMENTATION
// ============================================

impl RunnerConfig {
    /// Load config from `path`.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file does not exist.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable, not valid JSON, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::read_error(path, e)
        })?;

        let config: RunnerConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::parse_error(path, &e)
        })?;

        config.validate()?;

        info!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::validation("url cannot be empty"));
        }

        // Absolute URLs must use a scheme the webview can load; anything else
        // must be a resource path served by the native process.
        match Url::parse(&self.url) {
            Ok(url) if !ALLOWED_URL_SCHEMES.contains(&url.scheme()) => {
                return Err(ConfigError::validation(format!(
                    "Unsupported URL scheme: {}",
                    url.scheme()
                )));
            }
            Ok(_) => {}
            Err(_) if self.url.starts_with('/') => {}
            Err(e) => {
                return Err(ConfigError::validation(format!(
                    "Invalid URL '{}': {e}",
                    self.url
                )));
            }
        }

        if self.auth_file.as_os_str().is_empty() {
            return Err(ConfigError::validation("authFile cannot be empty"));
        }

        if !(MIN_RECONNECT_DELAY_MS..=MAX_RECONNECT_DELAY_MS).contains(&self.reconnect_delay_ms) {
            return Err(ConfigError::validation(format!(
                "Invalid reconnect delay: {}ms (must be {}-{})",
                self.reconnect_delay_ms, MIN_RECONNECT_DELAY_MS, MAX_RECONNECT_DELAY_MS
            )));
        }

        Ok(())
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            auth_file: self.auth_file.clone(),
            extension_id: self.extension_id.clone(),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            ..BridgeConfig::default()
        }
    }

    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            url: self.url.clone(),
            window: self.window.clone(),
            binary_dir: self.binary_dir.clone(),
            binary_name: self.binary_name.clone(),
        }
    }
}
