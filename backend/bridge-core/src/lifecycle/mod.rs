//! Native process lifecycle.
//!
//! [`LifecycleController::start`] arms a bridge session, launches the native
//! binary for the current platform and returns at once. A watcher task then
//! waits for the process to end, shuts the session down, and (when the window
//! options ask for it) exits the host with the native exit code.

pub mod args;
pub mod binary;
pub mod launcher;

pub use binary::{BinaryCatalog, Platform};
pub use launcher::{LaunchedProcess, ProcessLauncher, TokioLauncher};

use crate::auth::{AuthFile, CredentialSource};
use crate::config::{BridgeConfig, RunnerConfig};
use crate::error::{CoreError, LaunchError};
use crate::session::{BridgeClient, spawn_session};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;
use tokio::sync::watch;

/// Exit code reported when the native process ended without one.
pub const SIGNALLED_EXIT_CODE: i32 = 1;

/// Called with the native exit code when the host should exit with it.
pub type HostExit = Arc<dyn Fn(i32) + Send + Sync>;

/// What to launch and how the window should look.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub url: String,
    /// Window options, camelCase keys as the native side documents them.
    pub window: BTreeMap<String, Value>,
    pub binary_dir: PathBuf,
    /// Explicit binary file name inside `binary_dir`; skips the catalog.
    pub binary_name: Option<String>,
}

impl Default for LaunchSpec {
    fn default() -> Self {
        Self {
            url: "/".to_string(),
            window: BTreeMap::new(),
            binary_dir: PathBuf::from("bin"),
            binary_name: None,
        }
    }
}

impl LaunchSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_window_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.window.insert(key.into(), value.into());
        self
    }

    pub fn with_binary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binary_dir = dir.into();
        self
    }

    pub fn with_binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = Some(name.into());
        self
    }

    /// Whether the host should exit when the native process does.
    pub fn exit_process_on_close(&self) -> bool {
        self.window
            .get(args::EXIT_PROCESS_ON_CLOSE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn args(&self) -> Vec<String> {
        args::launch_args(&self.url, &self.window)
    }
}

/// How the native process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeExit {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl NativeExit {
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Code to mirror on the host.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(SIGNALLED_EXIT_CODE)
    }
}

/// A launched native application and its bridge session.
pub struct NativeApp {
    client: BridgeClient,
    pid: Option<u32>,
    binary: PathBuf,
    exit_rx: watch::Receiver<Option<NativeExit>>,
}

impl NativeApp {
    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Exit status, if the process has already ended and teardown finished.
    pub fn try_exit(&self) -> Option<NativeExit> {
        *self.exit_rx.borrow()
    }

    /// Wait until the process ends and the session is torn down.
    pub async fn wait(&self) -> NativeExit {
        let mut exit_rx = self.exit_rx.clone();
        let exit = match exit_rx.wait_for(Option::is_some).await {
            Ok(exit) => *exit,
            Err(_) => None,
        };
        exit.unwrap_or(NativeExit { code: None })
    }
}

pub struct LifecycleController {
    launcher: Arc<dyn ProcessLauncher>,
    catalog: BinaryCatalog,
    platform: Platform,
    host_exit: HostExit,
    credentials: Option<Arc<dyn CredentialSource>>,
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self {
            launcher: Arc::new(TokioLauncher),
            catalog: BinaryCatalog::default(),
            platform: Platform::current(),
            host_exit: Arc::new(|code| std::process::exit(code)),
            credentials: None,
        }
    }
}

impl LifecycleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_launcher(mut self, launcher: impl ProcessLauncher) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    pub fn with_catalog(mut self, catalog: BinaryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace `std::process::exit` as the host exit hook.
    pub fn with_host_exit<F>(mut self, host_exit: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.host_exit = Arc::new(host_exit);
        self
    }

    /// Use a credential source other than the configured auth file.
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Path of the binary `spec` would launch on this controller's platform.
    pub fn binary_path(&self, spec: &LaunchSpec) -> Result<PathBuf, LaunchError> {
        match &spec.binary_name {
            Some(name) => Ok(spec.binary_dir.join(name)),
            None => self.catalog.resolve(&spec.binary_dir, &self.platform),
        }
    }

    /// Launch the native process and arm its session.
    ///
    /// Returns as soon as the process is spawned; the session keeps connecting
    /// in the background.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] if no binary matches the platform or the process
    /// cannot be started. Nothing is left running in either case.
    pub async fn start(
        &self,
        spec: &LaunchSpec,
        config: BridgeConfig,
    ) -> Result<NativeApp, LaunchError> {
        let binary = self.binary_path(spec)?;
        let exit_on_close = spec.exit_process_on_close();

        let credentials: Arc<dyn CredentialSource> = match &self.credentials {
            Some(credentials) => Arc::clone(credentials),
            None => Arc::new(AuthFile::new(config.auth_file.clone())),
        };
        let client = spawn_session(config, credentials);

        let LaunchedProcess { pid, exit } = match self.launcher.launch(&binary, &spec.args()) {
            Ok(process) => process,
            Err(e) => {
                client.shutdown().await;
                return Err(e);
            }
        };

        let (exit_tx, exit_rx) = watch::channel(None);
        let watcher_client = client.clone();
        let host_exit = Arc::clone(&self.host_exit);
        let binary_name = binary
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        tokio::spawn(async move {
            let exit = NativeExit { code: exit.await };

            if exit.is_success() {
                info!("{binary_name} was stopped with success code 0");
            } else {
                warn!(
                    "{binary_name} was stopped with error code {}",
                    exit.exit_code()
                );
            }

            watcher_client.shutdown().await;
            let _ = exit_tx.send(Some(exit));

            if exit_on_close {
                info!("Exiting with native exit code {}", exit.exit_code());
                host_exit(exit.exit_code());
            }
        });

        Ok(NativeApp {
            client,
            pid,
            binary,
            exit_rx,
        })
    }

    /// Validate a runner config, then [`LifecycleController::start`] with it.
    pub async fn start_with_config(&self, config: &RunnerConfig) -> Result<NativeApp, CoreError> {
        config.validate()?;
        Ok(self
            .start(&config.launch_spec(), config.bridge_config())
            .await?)
    }
}
