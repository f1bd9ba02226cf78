use crate::helpers::{
    MockNative, TEST_ACCESS_TOKEN, TEST_TIMEOUT, auth_path, test_config, wait_for_state,
    write_credentials,
};

use bridge_core::error::{CoreError, LaunchError};
use bridge_core::lifecycle::{LaunchedProcess, Platform, ProcessLauncher};
use bridge_core::{ConnectionState, LaunchSpec, LifecycleController, RunnerConfig};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::time::timeout;

/// Launcher that records what it was asked to run and exits when told to.
#[derive(Clone)]
struct FakeLauncher {
    launched: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
    exit_rx: Arc<Mutex<Option<oneshot::Receiver<Option<i32>>>>>,
}

impl FakeLauncher {
    /// Returns the launcher and the trigger that ends the fake process.
    fn new() -> (Self, oneshot::Sender<Option<i32>>) {
        let (exit_tx, exit_rx) = oneshot::channel();
        let launcher = Self {
            launched: Arc::default(),
            exit_rx: Arc::new(Mutex::new(Some(exit_rx))),
        };
        (launcher, exit_tx)
    }

    fn launched(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> Result<LaunchedProcess, LaunchError> {
        self.launched
            .lock()
            .unwrap()
            .push((program.to_path_buf(), args.to_vec()));
        let exit_rx = self.exit_rx.lock().unwrap().take().expect("launched once");
        Ok(LaunchedProcess {
            pid: Some(4242),
            exit: async move { exit_rx.await.unwrap_or(None) }.boxed(),
        })
    }
}

struct FailingLauncher;

impl ProcessLauncher for FailingLauncher {
    fn launch(&self, program: &Path, _args: &[String]) -> Result<LaunchedProcess, LaunchError> {
        Err(LaunchError::Spawn {
            message: format!("cannot run {}", program.display()),
            location: common::ErrorLocation::from(std::panic::Location::caller()),
            source: Box::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
        })
    }
}

fn host_exit_recorder() -> (Arc<Mutex<Vec<i32>>>, impl Fn(i32) + Send + Sync + 'static) {
    let codes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&codes);
    (codes, move |code| sink.lock().unwrap().push(code))
}

fn linux_x64() -> Platform {
    Platform::new("linux", "x86_64")
}

/// **VALUE**: Window options reach the native binary as `--window-*` flags.
#[tokio::test]
async fn given_title_bar_style_option_when_started_then_flag_is_passed() {
    // GIVEN: A launch spec with titleBarStyle hidden
    let dir = TempDir::new().unwrap();
    let (launcher, exit_tx) = FakeLauncher::new();
    let controller = LifecycleController::new()
        .with_launcher(launcher.clone())
        .with_platform(linux_x64());
    let spec = LaunchSpec::new("/")
        .with_window_option("titleBarStyle", "hidden")
        .with_binary_dir(dir.path().join("bin"));

    // WHEN: Starting
    let app = controller
        .start(&spec, test_config(&auth_path(dir.path())))
        .await
        .unwrap();

    // THEN: The platform binary ran with the mapped flag
    let launched = launcher.launched();
    assert_eq!(launched.len(), 1);
    let (program, args) = &launched[0];
    assert_eq!(program, &dir.path().join("bin").join("neutralino-linux_x64"));
    assert!(
        args.contains(&"--window-title-bar-style=hidden".to_string()),
        "{args:?}"
    );
    assert!(args.contains(&"--export-auth-info".to_string()));
    assert_eq!(app.pid(), Some(4242));

    let _ = exit_tx.send(Some(0));
    app.wait().await;
}

/// **VALUE**: Exit code 2 is mirrored to the host and the credential file is removed.
///
/// **WHY THIS MATTERS**: Build scripts wrap the app and check its exit code; a stale
/// credential file makes the next run connect to a dead port first.
#[tokio::test]
async fn given_exit_mirroring_when_native_exits_with_two_then_host_exits_with_two() {
    // GIVEN: A running app with exitProcessOnClose and a connected session
    let dir = TempDir::new().unwrap();
    let auth = auth_path(dir.path());
    let native = MockNative::start().await;
    write_credentials(&auth, native.port(), TEST_ACCESS_TOKEN);

    let (launcher, exit_tx) = FakeLauncher::new();
    let (codes, host_exit) = host_exit_recorder();
    let controller = LifecycleController::new()
        .with_launcher(launcher)
        .with_platform(linux_x64())
        .with_host_exit(host_exit);
    let spec = LaunchSpec::new("/").with_window_option("exitProcessOnClose", true);

    let app = controller.start(&spec, test_config(&auth)).await.unwrap();
    wait_for_state(app.client(), ConnectionState::Open).await;

    // WHEN: The native process exits with code 2
    exit_tx.send(Some(2)).unwrap();
    let exit = timeout(TEST_TIMEOUT, app.wait()).await.unwrap();

    // THEN: Code reported, host exit called with it, transport torn down, file removed
    assert_eq!(exit.code, Some(2));
    assert!(!exit.is_success());
    assert_eq!(*codes.lock().unwrap(), vec![2]);
    assert_eq!(app.client().state(), ConnectionState::Disconnected);
    assert!(!auth.exists(), "credential file should be removed");
    assert_eq!(app.try_exit(), Some(exit));
}

#[tokio::test]
async fn given_no_mirroring_when_native_exits_then_host_keeps_running() {
    let dir = TempDir::new().unwrap();
    let (launcher, exit_tx) = FakeLauncher::new();
    let (codes, host_exit) = host_exit_recorder();
    let controller = LifecycleController::new()
        .with_launcher(launcher)
        .with_platform(linux_x64())
        .with_host_exit(host_exit);

    let app = controller
        .start(&LaunchSpec::new("/"), test_config(&auth_path(dir.path())))
        .await
        .unwrap();
    assert!(app.try_exit().is_none());

    exit_tx.send(Some(0)).unwrap();
    let exit = timeout(TEST_TIMEOUT, app.wait()).await.unwrap();

    assert!(exit.is_success());
    assert!(codes.lock().unwrap().is_empty());
}

/// **VALUE**: Calls still waiting when the native process dies are rejected.
///
/// **BUG THIS CATCHES**: Would catch the exit path skipping session shutdown, leaving
/// callers awaiting a process that no longer exists.
#[tokio::test]
async fn given_queued_call_when_native_exits_then_call_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (launcher, exit_tx) = FakeLauncher::new();
    let controller = LifecycleController::new()
        .with_launcher(launcher)
        .with_platform(linux_x64());
    let app = controller
        .start(&LaunchSpec::new("/"), test_config(&auth_path(dir.path())))
        .await
        .unwrap();

    let client = app.client().clone();
    let call = tokio::spawn(async move { client.call("app.getConfig", Value::Null).await });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    exit_tx.send(Some(1)).unwrap();
    app.wait().await;

    let error = timeout(TEST_TIMEOUT, call).await.unwrap().unwrap().unwrap_err();
    assert!(error.is_session_closed(), "{error}");
}

/// **VALUE**: A signal-killed process is reported without a code and mirrored as 1.
#[tokio::test]
async fn given_signal_kill_when_mirroring_then_host_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let (launcher, exit_tx) = FakeLauncher::new();
    let (codes, host_exit) = host_exit_recorder();
    let controller = LifecycleController::new()
        .with_launcher(launcher)
        .with_platform(linux_x64())
        .with_host_exit(host_exit);
    let spec = LaunchSpec::new("/").with_window_option("exitProcessOnClose", true);

    let app = controller
        .start(&spec, test_config(&auth_path(dir.path())))
        .await
        .unwrap();
    exit_tx.send(None).unwrap();
    let exit = app.wait().await;

    assert_eq!(exit.code, None);
    assert_eq!(*codes.lock().unwrap(), vec![1]);
}

/// **VALUE**: An unsupported platform fails fast and launches nothing.
#[tokio::test]
async fn given_unsupported_platform_when_started_then_returns_error_without_launching() {
    let dir = TempDir::new().unwrap();
    let (launcher, _exit_tx) = FakeLauncher::new();
    let controller = LifecycleController::new()
        .with_launcher(launcher.clone())
        .with_platform(Platform::new("plan9", "mips"));

    let result = controller
        .start(&LaunchSpec::new("/"), test_config(&auth_path(dir.path())))
        .await;

    assert!(matches!(
        result,
        Err(LaunchError::UnsupportedPlatform { .. })
    ));
    assert!(launcher.launched().is_empty());
}

#[tokio::test]
async fn given_explicit_binary_name_when_started_then_catalog_is_skipped() {
    let dir = TempDir::new().unwrap();
    let (launcher, exit_tx) = FakeLauncher::new();
    let controller = LifecycleController::new()
        .with_launcher(launcher.clone())
        .with_platform(Platform::new("plan9", "mips"));
    let spec = LaunchSpec::new("/")
        .with_binary_dir("dist")
        .with_binary_name("my-native");

    let app = controller
        .start(&spec, test_config(&auth_path(dir.path())))
        .await
        .unwrap();

    assert_eq!(launcher.launched()[0].0, Path::new("dist").join("my-native"));
    let _ = exit_tx.send(Some(0));
    app.wait().await;
}

#[tokio::test]
async fn given_spawn_failure_when_started_then_error_is_returned() {
    let dir = TempDir::new().unwrap();
    let controller = LifecycleController::new()
        .with_launcher(FailingLauncher)
        .with_platform(linux_x64());

    let result = controller
        .start(&LaunchSpec::new("/"), test_config(&auth_path(dir.path())))
        .await;

    assert!(matches!(result, Err(LaunchError::Spawn { .. })));
}

#[tokio::test]
async fn given_invalid_runner_config_when_started_then_config_error_is_returned() {
    let (launcher, _exit_tx) = FakeLauncher::new();
    let controller = LifecycleController::new().with_launcher(launcher.clone());
    let config = RunnerConfig {
        reconnect_delay_ms: 0,
        ..RunnerConfig::default()
    };

    let result = controller.start_with_config(&config).await;

    assert!(matches!(result, Err(CoreError::Config(_))));
    assert!(launcher.launched().is_empty());
}

/// **VALUE**: The real launcher makes the binary executable, runs it and reports its
/// exit code.
#[cfg(unix)]
#[tokio::test]
async fn given_real_binary_when_started_with_tokio_launcher_then_exit_code_is_reported() {
    use std::fs;

    // GIVEN: A "native binary" that is a shell script exiting with 3, not yet executable
    let dir = TempDir::new().unwrap();
    let bin_dir = dir.path().join("bin");
    fs::create_dir_all(&bin_dir).unwrap();
    fs::write(bin_dir.join("fake-native"), "#!/bin/sh\nexit 3\n").unwrap();

    let controller = LifecycleController::new();
    let spec = LaunchSpec::new("/")
        .with_binary_dir(&bin_dir)
        .with_binary_name("fake-native");

    // WHEN: Started through the default launcher
    let app = controller
        .start(&spec, test_config(&auth_path(dir.path())))
        .await
        .unwrap();
    let exit = timeout(TEST_TIMEOUT, app.wait()).await.unwrap();

    // THEN: The script ran and its exit code came back
    assert!(app.pid().is_some());
    assert_eq!(exit.code, Some(3));
}
