use crate::lifecycle::launcher::build_launch_command;
use crate::lifecycle::{LaunchSpec, NativeExit};

use std::path::Path;

use serde_json::json;

#[test]
fn given_exit_process_on_close_option_when_checked_then_reflects_flag() {
    assert!(!LaunchSpec::default().exit_process_on_close());
    assert!(
        LaunchSpec::new("/")
            .with_window_option("exitProcessOnClose", true)
            .exit_process_on_close()
    );
    assert!(
        !LaunchSpec::new("/")
            .with_window_option("exitProcessOnClose", json!("yes"))
            .exit_process_on_close(),
        "only a JSON boolean counts"
    );
}

/// **VALUE**: `exitProcessOnClose` is still forwarded to the native binary as a flag.
#[test]
fn given_exit_process_on_close_when_args_built_then_flag_is_forwarded() {
    let spec = LaunchSpec::new("/").with_window_option("exitProcessOnClose", true);

    assert!(
        spec.args()
            .contains(&"--window-exit-process-on-close=true".to_string())
    );
}

#[test]
fn given_exit_codes_when_inspected_then_success_and_mirror_codes_follow() {
    assert!(NativeExit { code: Some(0) }.is_success());
    assert!(!NativeExit { code: Some(3) }.is_success());
    assert_eq!(NativeExit { code: Some(3) }.exit_code(), 3);
    assert_eq!(NativeExit { code: None }.exit_code(), 1);
}

#[test]
fn given_program_and_args_when_command_built_then_passes_them_unchanged() {
    let args = vec!["--url=/".to_string(), "--window-title=\"A B\"".to_string()];

    let cmd = build_launch_command(Path::new("bin/neutralino-linux_x64"), &args);

    let std_cmd = cmd.as_std();
    assert_eq!(std_cmd.get_program(), "bin/neutralino-linux_x64");
    let passed: Vec<_> = std_cmd.get_args().collect();
    assert_eq!(passed, vec!["--url=/", "--window-title=\"A B\""]);
}
