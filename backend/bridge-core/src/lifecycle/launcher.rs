//! Starting the native process.

use crate::error::LaunchError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::process::Stdio;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use tokio::process::Command as TokioCommand;

#[cfg(unix)]
const EXEC_PERMISSION: u32 = 0o755;

/// A running native process.
pub struct LaunchedProcess {
    pub pid: Option<u32>,
    /// Resolves with the exit code once the process ends; `None` when it was
    /// killed by a signal or could not be waited on.
    pub exit: BoxFuture<'static, Option<i32>>,
}

/// Seam between the lifecycle controller and the OS.
pub trait ProcessLauncher: Send + Sync + 'static {
    fn launch(&self, program: &Path, args: &[String]) -> Result<LaunchedProcess, LaunchError>;
}

/// Launches real processes with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

pub(crate) fn build_launch_command(program: &Path, args: &[String]) -> TokioCommand {
    let mut cmd = TokioCommand::new(program);
    cmd.args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    cmd
}

#[cfg(unix)]
#[track_caller]
fn ensure_executable(program: &Path) -> Result<(), LaunchError> {
    use std::fs::{Permissions, set_permissions};
    use std::os::unix::fs::PermissionsExt;

    set_permissions(program, Permissions::from_mode(EXEC_PERMISSION)).map_err(|e| {
        LaunchError::Permission {
            message: format!("Failed to make {} executable: {e}", program.display()),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn ensure_executable(_program: &Path) -> Result<(), LaunchError> {
    Ok(())
}

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> Result<LaunchedProcess, LaunchError> {
        ensure_executable(program)?;

        info!("Starting process: {} {}", program.display(), args.join(" "));

        let mut child = build_launch_command(program, args)
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                message: format!("Failed to spawn {}: {e}", program.display()),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        let pid = child.id();
        debug!("Native process started (PID: {pid:?})");

        let exit = async move {
            match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!("Failed to wait on native process: {e}");
                    None
                }
            }
        }
        .boxed();

        Ok(LaunchedProcess { pid, exit })
    }
}
