//! One run of the native application, from config file to exit code.

use crate::cli::Cli;
use crate::error::RunnerError;
use crate::logger;

use bridge_core::{BridgeClient, LifecycleController, NativeApp, NativeEvent, NativeExit, RunnerConfig};

use std::fs::create_dir_all;

use log::{debug, info, warn};

/// Native events the runner reports in its own log.
pub const LOGGED_EVENTS: [&str; 5] = [
    "ready",
    "windowClose",
    "serverOffline",
    "appClientConnect",
    "appClientDisconnect",
];

/// Load config, start logging, launch the native app and wait for it.
///
/// Ctrl-C asks the native side to exit; the run still ends only when the
/// process does.
pub async fn run(cli: Cli) -> Result<i32, RunnerError> {
    let config = cli.load_config()?;

    let log_dir = cli.log_dir(&config);
    create_dir_all(&log_dir).map_err(|e| {
        RunnerError::runner(format!(
            "Failed to create log directory {}: {e}",
            log_dir.display()
        ))
    })?;
    logger::initialize(&log_dir, cli.log_level)?;

    info!("Launching {} from {}", config.url, config.binary_dir.display());

    // The exit code leaves through main's return value so logs get flushed.
    let controller = LifecycleController::new()
        .with_host_exit(|code| debug!("Host exit with code {code} requested"));

    run_app(&config, &controller).await
}

/// Start the app `config` describes and wait for the native process to end.
///
/// Returns the host exit status: the native exit code when
/// `exitProcessOnClose` is set, otherwise 0.
pub async fn run_app(
    config: &RunnerConfig,
    controller: &LifecycleController,
) -> Result<i32, RunnerError> {
    let app = controller.start_with_config(config).await?;
    info!(
        "Native process {} started (PID: {:?})",
        app.binary().display(),
        app.pid()
    );

    watch_events(app.client());

    let exit = wait_for_exit(&app).await;
    Ok(host_exit_code(
        config.launch_spec().exit_process_on_close(),
        exit,
    ))
}

/// Exit status for the host once the native process has ended.
pub fn host_exit_code(mirror_native_exit: bool, exit: NativeExit) -> i32 {
    if mirror_native_exit {
        return exit.exit_code();
    }

    if !exit.is_success() {
        warn!(
            "Native process exited with code {}, not mirrored (exitProcessOnClose is off)",
            exit.exit_code()
        );
    }
    0
}

/// Exit codes `std::process::ExitCode` can carry; others need `process::exit`.
pub fn portable_exit_code(code: i32) -> Option<u8> {
    u8::try_from(code).ok()
}

/// Register log listeners for [`LOGGED_EVENTS`].
pub fn watch_events(client: &BridgeClient) {
    for name in LOGGED_EVENTS {
        client.on(name, log_event);
    }
}

fn log_event(event: &NativeEvent) {
    info!("Native event: {}", event.name);
    debug!("{} payload: {:?}", event.name, event.payload);
}

async fn wait_for_exit(app: &NativeApp) -> NativeExit {
    tokio::select! {
        exit = app.wait() => return exit,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("Failed to listen for Ctrl-C: {e}");
                return app.wait().await;
            }
        }
    }

    info!("Interrupted, asking the native process to exit");
    if let Err(e) = app.client().app().exit(None).await {
        warn!("Exit request failed: {e}");
    }

    app.wait().await
}
