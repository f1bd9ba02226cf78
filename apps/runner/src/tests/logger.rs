// Unit tests for logger initialization
// Only one test installs the global logger; the failure path stops before that.

use crate::error::RunnerError;
use crate::logger::{LOG_FILE_NAME, initialize, initialize_internal};

use std::path::PathBuf;

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() twice does not panic or fail.
///
/// **WHY THIS MATTERS**: The runner and anything embedding it may both try to
/// set up logging. A second call must be a no-op, not a startup crash.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when setting a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable log directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let first = initialize(temp_dir.path(), Some(LevelFilter::Info));
    let second = initialize(temp_dir.path(), Some(LevelFilter::Debug));

    // THEN: Both succeed and the log file exists
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should be a no-op");
    assert!(temp_dir.path().join(LOG_FILE_NAME).exists());
}

/// **VALUE**: Verifies that an unwritable log directory is reported, not a panic.
///
/// **WHY THIS MATTERS**: A missing or read-only data directory must surface as
/// a clear runner error before the native process is launched.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` were unwrapped.
#[test]
fn given_invalid_log_dir_when_initializing_then_returns_runner_error() {
    // GIVEN: A path that cannot hold a file
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch
    let result = initialize_internal(&invalid_dir, LevelFilter::Info);

    // THEN: A Runner error naming the log file
    match result {
        Err(RunnerError::Runner { message, .. }) => {
            assert!(message.contains("Failed to create log file"), "{message}");
        }
        other => panic!("Expected RunnerError::Runner, got {other:?}"),
    }
}
