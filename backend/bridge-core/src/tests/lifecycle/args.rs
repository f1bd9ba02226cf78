use crate::lifecycle::args::{
    BASE_FLAGS, launch_args, normalize_value, option_flag_name, process_args, window_command,
    window_flags,
};

use std::collections::BTreeMap;

use serde_json::{Value, json};

fn options(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn given_camel_case_keys_when_mapped_then_become_window_kebab_flags() {
    let cases = [
        ("titleBarStyle", "--window-title-bar-style"),
        ("width", "--window-width"),
        ("alwaysOnTop", "--window-always-on-top"),
        ("enableInspector", "--window-enable-inspector"),
        ("X", "--window-x"),
    ];

    for (key, expected) in cases {
        assert_eq!(option_flag_name(key), expected, "key {key}");
    }
}

/// **VALUE**: String values are trimmed and quoted only when they contain whitespace.
///
/// **BUG THIS CATCHES**: Would catch quoting every value, which the native argument
/// parser keeps literally (`--window-title="Main"` becomes a title with quotes).
#[test]
fn given_values_when_normalized_then_whitespace_values_are_quoted() {
    assert_eq!(normalize_value(&json!("  plain ")), "plain");
    assert_eq!(normalize_value(&json!(" My App ")), "\"My App\"");
    assert_eq!(normalize_value(&json!("tab\tseparated")), "\"tab\tseparated\"");
    assert_eq!(normalize_value(&json!(800)), "800");
    assert_eq!(normalize_value(&json!(true)), "true");
}

#[test]
fn given_options_when_flags_built_then_process_args_is_excluded() {
    let flags = window_flags(&options(&[
        ("title", json!("Demo")),
        ("processArgs", json!("--extra")),
    ]));

    assert_eq!(flags, vec!["--window-title=Demo"]);
}

/// **VALUE**: The full argument list has base flags, url, window flags, then passthrough.
///
/// **WHY THIS MATTERS**: The native binary only writes its credential file with
/// `--export-auth-info`; dropping a base flag means the session never connects.
#[test]
fn given_launch_spec_when_args_built_then_layout_is_base_url_window_passthrough() {
    // GIVEN: A url, window options and a passthrough string
    let opts = options(&[
        ("titleBarStyle", json!("hidden")),
        ("width", json!(800)),
        ("processArgs", json!("--verbose --name=\"two words\"")),
    ]);

    // WHEN: Building the launch arguments
    let args = launch_args("/resources/", &opts);

    // THEN: The order is fixed
    let mut expected: Vec<String> = BASE_FLAGS.iter().map(|f| f.to_string()).collect();
    expected.extend([
        "--url=/resources/".to_string(),
        "--window-title-bar-style=hidden".to_string(),
        "--window-width=800".to_string(),
        "--verbose".to_string(),
        "--name=two words".to_string(),
    ]);
    assert_eq!(args, expected);
}

/// **VALUE**: Argument order does not depend on how the options were inserted.
///
/// **BUG THIS CATCHES**: Would catch switching the options map to a `HashMap`.
#[test]
fn given_same_options_in_different_order_when_args_built_then_identical() {
    let forward = options(&[("a", json!(1)), ("b", json!(2)), ("c", json!(3))]);
    let backward = options(&[("c", json!(3)), ("b", json!(2)), ("a", json!(1))]);

    assert_eq!(launch_args("/", &forward), launch_args("/", &backward));
}

#[test]
fn given_url_with_spaces_when_args_built_then_url_is_quoted() {
    let args = launch_args(" /my page ", &BTreeMap::new());

    assert!(args.contains(&"--url=\"/my page\"".to_string()), "{args:?}");
}

#[test]
fn given_unbalanced_quotes_when_process_args_split_then_falls_back_to_whitespace() {
    let split = process_args(&options(&[("processArgs", json!("--a \"--b"))]));

    assert_eq!(split, vec!["--a", "\"--b"]);
}

#[test]
fn given_empty_or_missing_process_args_when_split_then_nothing_is_appended() {
    assert!(process_args(&BTreeMap::new()).is_empty());
    assert!(process_args(&options(&[("processArgs", json!("   "))])).is_empty());
    assert!(process_args(&options(&[("processArgs", Value::Null)])).is_empty());
}

/// **VALUE**: Child windows never restore saved state and keep passthrough text as written.
#[test]
fn given_child_window_options_when_command_built_then_saved_state_is_disabled() {
    let opts = options(&[
        ("title", json!("Child Window")),
        ("useSavedState", json!(true)),
        ("processArgs", json!("--x=1 --y=2")),
    ]);

    let command = window_command("/child.html", &opts);

    assert_eq!(
        command,
        "--url=/child.html --window-title=\"Child Window\" --window-use-saved-state=false --x=1 --y=2"
    );
}
