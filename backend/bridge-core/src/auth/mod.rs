//! Credentials published by the native process.
//!
//! The native binary is started with `--export-auth-info` and writes a small
//! JSON file once its WebSocket server is listening:
//!
//! ```json
//! { "nlPort": 51234, "nlConnectToken": "...", "nlToken": "..." }
//! ```
//!
//! The file is read once per connection attempt. Reading races the native
//! startup, so a missing or half-written file is an expected outcome and maps
//! to `None`; retrying is the reconnection policy's job, not this module's.

use crate::error::TransportError;
use crate::{DEFAULT_AUTH_FILE, NATIVE_WS_BASE_URL};

use common::RedactedToken;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};
use serde::Deserialize;
use url::Url;

const EXTENSION_ID_PARAM: &str = "extensionId";
const CONNECT_TOKEN_PARAM: &str = "connectToken";

/// Port and tokens needed to open the transport and sign requests.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "nlPort")]
    pub port: u16,
    #[serde(rename = "nlConnectToken")]
    pub connect_token: RedactedToken,
    #[serde(rename = "nlToken")]
    pub access_token: RedactedToken,
}

impl Credentials {
    /// Build `ws://127.0.0.1:<port>?extensionId=<id>&connectToken=<token>`.
    pub fn endpoint(&self, extension_id: &str) -> Result<Url, TransportError> {
        let mut url = Url::parse(&format!("{NATIVE_WS_BASE_URL}:{}", self.port))?;
        url.query_pairs_mut()
            .append_pair(EXTENSION_ID_PARAM, extension_id)
            .append_pair(CONNECT_TOKEN_PARAM, self.connect_token.as_str());
        Ok(url)
    }
}

/// Where session credentials come from.
///
/// Implementations must never fail loudly: `load` returns `None` for anything
/// short of a complete, parseable credential set.
pub trait CredentialSource: Send + Sync + 'static {
    fn load(&self) -> Option<Credentials>;

    /// Remove persisted credentials, if any. Called once on deliberate shutdown.
    fn remove(&self);
}

/// Credential file written by the native process.
#[derive(Debug, Clone)]
pub struct AuthFile {
    path: PathBuf,
}

impl AuthFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for AuthFile {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_FILE)
    }
}

impl CredentialSource for AuthFile {
    fn load(&self) -> Option<Credentials> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("Auth file {} not written yet", self.path.display());
                return None;
            }
            Err(e) => {
                debug!("Failed to read auth file {}: {e}", self.path.display());
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&contents) {
            Ok(credentials) => {
                debug!(
                    "Loaded credentials from {} (port {})",
                    self.path.display(),
                    credentials.port
                );
                Some(credentials)
            }
            Err(e) => {
                debug!("Auth file {} is not usable yet: {e}", self.path.display());
                None
            }
        }
    }

    fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Removed auth file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove auth file {}: {e}", self.path.display()),
        }
    }
}
